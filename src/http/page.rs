//! Index page.
//!
//! A single static page; all live data comes from `/api/payment-status`,
//! polled every 15 seconds.

const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Bitcoin Payment Gate</title>
    <link rel="stylesheet" href="/static/styles.css" />
  </head>
  <body>
    <main class="container">
      <section class="card">
        <h1>Payment gate</h1>
        <p class="subtitle">Bitcoin payment with automatic verification (1/1 confirmation)</p>

        <div class="info-grid">
          <div>
            <span class="label">Receiving BTC address</span>
            <code id="btc-address">{{ADDRESS}}</code>
          </div>
          <div>
            <span class="label">Transaction status</span>
            <strong id="status-text">Waiting for an incoming transaction...</strong>
          </div>
          <div>
            <span class="label">Detected amount</span>
            <strong id="amount-text">-</strong>
          </div>
          <div>
            <span class="label">Confirmations</span>
            <strong id="confirmations-text">0 / 1</strong>
          </div>
          <div>
            <span class="label">Incoming transaction id</span>
            <code id="txid-text">-</code>
          </div>
        </div>

        <a id="download-link" class="btn hidden" href="/download/bundle">Download {{BUNDLE}}</a>

        <section class="preview-window">
          <h2>Contents of {{BUNDLE}} (preview)</h2>
          <p id="preview-status" class="preview-status">Locked until the payment is confirmed (1/1).</p>
          <pre id="folder-preview">Payment required to view files.</pre>
        </section>

        <p id="error-text" class="error"></p>
      </section>
    </main>

    <script>
      const LOCKED_STATUS = 'Locked until the payment is confirmed (1/1).';
      const LOCKED_PREVIEW = 'Payment required to view files.';

      async function refreshPaymentStatus() {
        const el = (id) => document.getElementById(id);
        try {
          const response = await fetch('/api/payment-status');
          const data = await response.json();
          if (!response.ok || !data.ok) {
            throw new Error(data.error || 'Unknown verification error.');
          }
          el('error-text').textContent = '';

          if (!data.has_transaction) {
            el('status-text').textContent = data.message;
            el('amount-text').textContent = '-';
            el('confirmations-text').textContent = '0 / 1';
            el('txid-text').textContent = '-';
            el('download-link').classList.add('hidden');
            el('preview-status').textContent = LOCKED_STATUS;
            el('folder-preview').textContent = LOCKED_PREVIEW;
            return;
          }

          el('amount-text').textContent = `${data.amount_btc.toFixed(8)} BTC`;
          el('confirmations-text').textContent = `${Math.min(data.confirmations, 1)} / 1`;
          el('txid-text').textContent = data.txid || '-';

          if (data.is_unlocked) {
            el('status-text').textContent = data.message || 'Transaction confirmed. Download available.';
            el('download-link').classList.remove('hidden');
            el('preview-status').textContent = 'Payment confirmed: files available for preview.';
            el('folder-preview').textContent = (data.folder_contents && data.folder_contents.length)
              ? data.folder_contents.join('\n')
              : 'No files found.';
          } else {
            el('status-text').textContent = 'Transaction detected. Waiting for confirmation...';
            el('download-link').classList.add('hidden');
            el('preview-status').textContent = LOCKED_STATUS;
            el('folder-preview').textContent = LOCKED_PREVIEW;
          }
        } catch (error) {
          el('error-text').textContent = `Unable to verify the payment: ${error.message}`;
        }
      }

      refreshPaymentStatus();
      setInterval(refreshPaymentStatus, 15000);
    </script>
  </body>
</html>
"#;

/// Render the index page for `address` and the bundle directory name.
pub fn render_index(address: &str, bundle_name: &str) -> String {
    INDEX_TEMPLATE
        .replace("{{ADDRESS}}", &escape_html(address))
        .replace("{{BUNDLE}}", &escape_html(bundle_name))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_index() -> String {
    INDEX_HTML.replace("{{VERSION}}", env!("CARGO_PKG_VERSION"))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Blocklog</title>
  <style>
    :root {
      --bg: #0f172a;
      --panel: #1e293b;
      --line: #334155;
      --ink: #f1f5f9;
      --muted: #94a3b8;
      --accent: #0ea5e9;
      --danger: #f43f5e;
      --ok: #10b981;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 28px 18px 48px;
    }

    main {
      width: min(980px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    .panel {
      background: var(--panel);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 20px;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 14px;
    }

    .stat span {
      display: block;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .stat strong {
      font-size: 1.4rem;
    }

    form {
      display: grid;
      gap: 10px;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input, select, textarea, button {
      font: inherit;
      border-radius: 8px;
      border: 1px solid var(--line);
      background: #0b1220;
      color: var(--ink);
      padding: 8px 10px;
    }

    button {
      background: var(--accent);
      border: none;
      cursor: pointer;
      font-weight: 600;
    }

    button.secondary {
      background: transparent;
      border: 1px solid var(--line);
    }

    button.danger {
      background: var(--danger);
    }

    .card {
      border: 1px solid var(--line);
      border-radius: 10px;
      padding: 14px;
      display: grid;
      gap: 6px;
    }

    .card.open {
      border-left: 4px solid var(--danger);
    }

    .card.resolved {
      border-left: 4px solid var(--ok);
    }

    .tag {
      display: inline-block;
      border-radius: 999px;
      padding: 2px 10px;
      font-size: 0.75rem;
      margin-right: 4px;
      color: #0f172a;
    }

    .muted {
      color: var(--muted);
      font-size: 0.85rem;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
    }

    .status.error {
      color: var(--danger);
    }

    .hidden {
      display: none;
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>Blocklog</h1>
      <div class="row">
        <span class="muted">v{{VERSION}}</span>
        <button id="logout" class="secondary hidden" type="button">Log out</button>
      </div>
    </header>

    <p id="status" class="status"></p>

    <section id="auth" class="panel hidden">
      <form id="login-form">
        <h2>Log in</h2>
        <input name="email" type="email" placeholder="Email" required />
        <input name="password" type="password" placeholder="Password" required />
        <button type="submit">Log in</button>
      </form>
      <hr />
      <form id="register-form">
        <h2>Register</h2>
        <div class="row">
          <input name="firstName" placeholder="First name" required />
          <input name="lastName" placeholder="Last name" required />
        </div>
        <input name="email" type="email" placeholder="Email" required />
        <input name="password" type="password" placeholder="Password (8+ characters)" required />
        <button type="submit">Create account</button>
      </form>
    </section>

    <section id="app" class="hidden">
      <div class="stats">
        <div class="panel stat"><span>Total blocks</span><strong id="stat-total">0</strong></div>
        <div class="panel stat"><span>Ongoing blocks</span><strong id="stat-open">0</strong></div>
        <div class="panel stat"><span>Total time blocked</span><strong id="stat-blocked">0m</strong><span id="stat-phrase"></span></div>
        <div class="panel stat"><span>Longest block</span><strong id="stat-longest">0m</strong><span id="stat-longest-title"></span></div>
      </div>

      <div class="panel">
        <h2>Log new block</h2>
        <form id="block-form">
          <input name="title" placeholder="Title" required />
          <div class="row">
            <input name="environment" placeholder="Environment" required />
            <input name="createdBy" placeholder="Created by" required />
            <input name="communicationChannel" placeholder="Channel" />
          </div>
          <textarea name="problem" placeholder="Problem" required></textarea>
          <textarea name="action" placeholder="Action taken"></textarea>
          <input name="tags" placeholder="Tags, comma separated" />
          <button type="submit">Save block</button>
        </form>
      </div>

      <div class="panel">
        <div class="row">
          <h2>Block history</h2>
          <select id="sort">
            <option value="createdDate-desc">Start date (newest)</option>
            <option value="createdDate-asc">Start date (oldest)</option>
            <option value="duration-desc">Duration (longest)</option>
            <option value="duration-asc">Duration (shortest)</option>
            <option value="title-asc">Title (A-Z)</option>
            <option value="title-desc">Title (Z-A)</option>
          </select>
          <select id="status-filter">
            <option value="all">All statuses</option>
            <option value="open">Ongoing</option>
            <option value="resolved">Resolved</option>
          </select>
          <input id="tag-filter" placeholder="Filter tags (all must match)" />
          <button id="clear-filters" class="secondary" type="button">Clear</button>
        </div>
        <div id="blocks"></div>
      </div>

      <div class="panel">
        <h2>Monthly hours</h2>
        <div id="monthly" class="muted"></div>
      </div>

      <div class="panel row">
        <button id="export" type="button">Export all data</button>
        <label class="row">
          <span class="muted">Import from backup</span>
          <input id="import" type="file" accept=".json" />
        </label>
      </div>
    </section>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const authEl = document.getElementById('auth');
    const appEl = document.getElementById('app');
    const logoutEl = document.getElementById('logout');
    let ticker = null;

    const setStatus = (message, kind) => {
      statusEl.textContent = message;
      statusEl.className = `status ${kind || ''}`;
    };

    const token = () => localStorage.getItem('authToken');

    const api = async (path, options = {}) => {
      const headers = { 'Content-Type': 'application/json', ...(options.headers || {}) };
      if (token()) {
        headers.Authorization = `Bearer ${token()}`;
      }
      const res = await fetch(`/api${path}`, { ...options, headers });
      if (res.status === 401) {
        localStorage.removeItem('authToken');
        showAuth();
        throw new Error('Authentication required');
      }
      const isJson = (res.headers.get('content-type') || '').includes('application/json');
      const body = isJson ? await res.json() : null;
      if (!res.ok) {
        throw new Error((body && body.message) || `Request failed (${res.status})`);
      }
      return body;
    };

    const showAuth = () => {
      authEl.classList.remove('hidden');
      appEl.classList.add('hidden');
      logoutEl.classList.add('hidden');
    };

    const showApp = () => {
      authEl.classList.add('hidden');
      appEl.classList.remove('hidden');
      logoutEl.classList.remove('hidden');
    };

    const escapeHtml = (text) =>
      String(text).replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]));

    const listQuery = () => {
      const [sort, direction] = document.getElementById('sort').value.split('-');
      const params = new URLSearchParams({ sort, direction, status: document.getElementById('status-filter').value });
      const tags = document.getElementById('tag-filter').value.trim();
      if (tags) {
        params.set('tags', tags);
      }
      return params.toString();
    };

    const renderBlocks = (blocks) => {
      const container = document.getElementById('blocks');
      if (blocks.length === 0) {
        container.innerHTML = '<p class="muted">No blocks logged yet.</p>';
        return;
      }
      container.innerHTML = blocks.map((b) => `
        <article class="card ${b.status}">
          <div class="row"><strong>${escapeHtml(b.title)}</strong><span class="muted">${escapeHtml(b.environment)}</span></div>
          <div>${escapeHtml(b.problem)}</div>
          <div>${b.tags.map((t) => `<span class="tag" style="background:${t.color}">${escapeHtml(t.title)}</span>`).join('')}</div>
          <div class="muted">${new Date(b.created).toLocaleString()} &middot; ${escapeHtml(b.createdBy)} &middot; ${b.duration}</div>
          <div class="row">
            ${b.status === 'open' ? `<button data-resolve="${b.id}" type="button">Resolve</button>` : ''}
            <button class="danger" data-delete="${b.id}" type="button">Delete</button>
          </div>
        </article>`).join('');
    };

    const refresh = async () => {
      const [blocks, dashboard, monthly] = await Promise.all([
        api(`/blocks?${listQuery()}`),
        api('/analytics/dashboard'),
        api('/analytics/monthly'),
      ]);
      renderBlocks(blocks);
      const s = dashboard.summary;
      document.getElementById('stat-total').textContent = s.totalRecords;
      document.getElementById('stat-open').textContent = s.openRecords;
      document.getElementById('stat-blocked').textContent = s.totalBlocked;
      document.getElementById('stat-phrase').textContent = s.totalPhrase;
      document.getElementById('stat-longest').textContent = s.longest;
      document.getElementById('stat-longest-title').textContent = s.longestRecord ? s.longestRecord.title : '';
      document.getElementById('monthly').innerHTML = monthly.length
        ? monthly.map((m) => `<div>${m.label}: ${m.totalHours.toFixed(1)}h</div>`).join('')
        : 'No data yet.';
      clearInterval(ticker);
      if (s.openRecords > 0) {
        ticker = setInterval(() => api(`/blocks?${listQuery()}`).then(renderBlocks).catch(() => {}), 1000);
      }
    };

    const start = async () => {
      if (!token()) {
        try {
          await api('/health');
          await api('/blocks');
          showApp();
          await refresh();
        } catch (err) {
          showAuth();
        }
        return;
      }
      showApp();
      await refresh();
    };

    document.getElementById('login-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      try {
        const res = await api('/auth/login', { method: 'POST', body: JSON.stringify(Object.fromEntries(form)) });
        localStorage.setItem('authToken', res.accessToken);
        setStatus('', '');
        showApp();
        await refresh();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('register-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      try {
        await api('/auth/register', { method: 'POST', body: JSON.stringify(Object.fromEntries(form)) });
        setStatus('Account created, you can log in now.', '');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    logoutEl.addEventListener('click', async () => {
      await api('/auth/logout', { method: 'POST' }).catch(() => {});
      localStorage.removeItem('authToken');
      clearInterval(ticker);
      showAuth();
    });

    document.getElementById('block-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = Object.fromEntries(new FormData(event.target));
      form.tags = form.tags.split(',').map((t) => t.trim()).filter(Boolean).map((title) => ({ title }));
      try {
        await api('/blocks', { method: 'POST', body: JSON.stringify(form) });
        event.target.reset();
        await refresh();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('blocks').addEventListener('click', async (event) => {
      const { resolve, delete: remove } = event.target.dataset;
      try {
        if (resolve) {
          await api(`/blocks/${resolve}/resolve`, { method: 'PATCH' });
        } else if (remove && confirm('Delete this block?')) {
          await api(`/blocks/${remove}`, { method: 'DELETE' });
        } else {
          return;
        }
        await refresh();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    ['sort', 'status-filter', 'tag-filter'].forEach((id) => {
      document.getElementById(id).addEventListener('change', () => refresh().catch((err) => setStatus(err.message, 'error')));
    });

    document.getElementById('clear-filters').addEventListener('click', () => {
      document.getElementById('status-filter').value = 'all';
      document.getElementById('tag-filter').value = '';
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('export').addEventListener('click', async () => {
      const res = await fetch('/api/analytics/export', { headers: token() ? { Authorization: `Bearer ${token()}` } : {} });
      if (!res.ok) {
        setStatus('Export failed', 'error');
        return;
      }
      const disposition = res.headers.get('content-disposition') || '';
      const match = disposition.match(/filename="([^"]+)"/);
      const link = document.createElement('a');
      link.href = URL.createObjectURL(await res.blob());
      link.download = match ? match[1] : 'blocklog_backup.json';
      link.click();
    });

    document.getElementById('import').addEventListener('change', async (event) => {
      const file = event.target.files[0];
      if (!file) {
        return;
      }
      try {
        const text = await file.text();
        if (confirm('Importing replaces all current blocks. Continue?')) {
          const res = await api('/analytics/import', { method: 'POST', body: text });
          setStatus(`Imported ${res.imported} blocks`, '');
          await refresh();
        }
      } catch (err) {
        setStatus(`Import failed: ${err.message}`, 'error');
      } finally {
        event.target.value = '';
      }
    });

    start().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

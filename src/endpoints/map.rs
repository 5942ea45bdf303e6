pub(super) const INDEX_HTML: &str = r#"<!DOCTYPE html>
  <html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
    <title>Nightlight comparison</title>
    <link
      rel="stylesheet"
      href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
      integrity="sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY="
      crossorigin=""
    />
    {{ANALYTICS}}
    <style>
      html, body { height: 100%; margin: 0; padding: 0; background: #111; color: white;
                   font-family: sans-serif; }
      #panels { display: flex; flex-wrap: wrap; height: 100%; }
      .panel { position: relative; width: 50vw; height: 100vh; box-sizing: border-box;
               border: 1px solid black; }
      .panel .map { height: 100%; width: 100%; }
      @media (max-width: 600px) {
        .panel { width: 100vw; height: 50vh; }
      }
      .layer-select { position: absolute; top: 12px; right: 12px; z-index: 1000; }
      select { background: #222; color: white; border: 1px solid #555; border-radius: 4px;
               padding: 4px; }
      #region-control { position: absolute; top: 12px; left: 50%; transform: translateX(-50%);
                        z-index: 1001; }
      #loading { position: absolute; inset: 0; display: flex; align-items: center;
                 justify-content: center; z-index: 2000; background: #111; font-size: 18px; }
      #loading.hidden { display: none; }
      #legend { position: absolute; bottom: 20px; right: 20px; z-index: 1000; width: 322px; }
      #legend .title { font-weight: bold; margin-bottom: 6px; }
      #legend img { display: block; width: 300px; height: 8px; margin-left: 10px;
                    border: 1px solid white; }
      #legend .ticks { position: relative; height: 16px; margin: 2px 10px 0 10px; font-size: 10px; }
      #legend .ticks span { position: absolute; transform: translateX(-50%); }
      #legend .unit { text-align: right; font-size: 10px; margin-right: 12px; }
      #fullscreen { position: absolute; bottom: 20px; left: 20px; z-index: 1000;
                    background: transparent; color: white; border: none; font-size: 24px;
                    cursor: pointer; }
    </style>
  </head>
  <body>
    <div id="loading">Loading…</div>

    <div id="region-control">
      <select id="regionSelect" aria-label="Select Region"></select>
    </div>

    <div id="panels">
      <div class="panel">
        <div id="map-left" class="map"></div>
        <select id="layer-left" class="layer-select" aria-label="Left layer"></select>
      </div>
      <div class="panel">
        <div id="map-right" class="map"></div>
        <select id="layer-right" class="layer-select" aria-label="Right layer"></select>
      </div>
    </div>

    <div id="legend">
      <div class="title"></div>
      <img src="/legend.png?width=300&height=8" alt="" />
      <div class="ticks"></div>
      <div class="unit"></div>
    </div>

    <button id="fullscreen" title="Toggle fullscreen">⛶</button>

    <script
      src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
      integrity="sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo="
      crossorigin=""
    ></script>

    <script>
      const BASEMAP_URL = '{{BASEMAP_URL}}';
      const loading = document.getElementById('loading');
      const regionSelect = document.getElementById('regionSelect');

      // set while we move a map ourselves so its events are not reported back
      let applying = false;
      let socket;

      function send(message) {
        if (socket && socket.readyState === WebSocket.OPEN) {
          socket.send(JSON.stringify(message));
        }
      }

      function makePanel(side) {
        const map = L.map(`map-${side}`, {
          zoomSnap: 0,
          zoomControl: side === 'left',
          attributionControl: side === 'right',
        }).setView([0, 0], 2);

        L.tileLayer(BASEMAP_URL, {
          maxZoom: 19,
          attribution: '&copy; OpenStreetMap contributors &copy; CARTO',
        }).addTo(map);

        const panel = { side, map, select: document.getElementById(`layer-${side}`),
                        tileLayer: null, renderKey: null, options: [] };

        map.on('movestart', () => {
          if (!applying) send({ type: 'move_start', panel: side });
        });
        map.on('move', () => {
          if (applying) return;
          const centre = map.getCenter();
          send({ type: 'move', panel: side,
                 camera: { latitude: centre.lat, longitude: centre.lng, zoom: map.getZoom() } });
        });
        panel.select.addEventListener('change', () => {
          const option = panel.options[panel.select.selectedIndex];
          if (option) send({ type: 'select_layer', panel: side, layer: option.value });
        });
        return panel;
      }

      const panels = { left: makePanel('left'), right: makePanel('right') };

      function applyCamera(panel, camera) {
        applying = true;
        try {
          panel.map.setView([camera.latitude, camera.longitude], camera.zoom, { animate: false });
        } finally {
          applying = false;
        }
      }

      function setPanelView(panel, view) {
        const key = view ? view.render_key : null;
        if (key !== panel.renderKey) {
          // only rebuild the raster layer when the selected layer changes
          if (panel.tileLayer) panel.map.removeLayer(panel.tileLayer);
          panel.tileLayer = view
            ? L.tileLayer(view.tile_url, { opacity: 0.5, zIndex: 1 }).addTo(panel.map)
            : null;
          panel.renderKey = key;
        }
        const index = view ? panel.options.findIndex(o => o.value.key === view.layer.key) : -1;
        if (index >= 0) panel.select.selectedIndex = index;
      }

      function applyRegion(view) {
        const b = view.region.bounds; // [[lon, lat], [lon, lat]]
        const bounds = L.latLngBounds([b[0][1], b[0][0]], [b[1][1], b[1][0]]);
        regionSelect.value = String(view.region.id);

        Object.values(panels).forEach(panel => {
          applying = true;
          try {
            panel.map.setMinZoom(view.region.zoom.min);
            panel.map.setMaxZoom(view.region.zoom.max);
            panel.map.setMaxBounds(bounds);
          } finally {
            applying = false;
          }
          applyCamera(panel, view.camera);

          panel.options = view.layers;
          panel.select.innerHTML = '';
          view.layers.forEach(option => {
            const el = document.createElement('option');
            el.value = option.value.key;
            el.textContent = option.label;
            panel.select.appendChild(el);
          });
          setPanelView(panel, view[panel.side]);
        });

        loading.classList.toggle('hidden', view.status === 'ready');
      }

      function onUpdate(update) {
        switch (update.type) {
          case 'region':
            applyRegion(update);
            break;
          case 'camera':
            // the driving panel already shows this camera
            applyCamera(panels[update.driver === 'left' ? 'right' : 'left'], update.camera);
            break;
          case 'panel':
            setPanelView(panels[update.panel], update.view);
            break;
        }
      }

      function connect() {
        const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
        socket = new WebSocket(`${scheme}://${location.host}/ws`);
        socket.addEventListener('message', e => onUpdate(JSON.parse(e.data)));
        socket.addEventListener('close', () => {
          loading.classList.remove('hidden');
          setTimeout(connect, 2000);
        });
      }

      async function initRegions() {
        const res = await fetch('/regions');
        const regions = await res.json(); // [{ id, label }, …]
        regionSelect.innerHTML = '';
        regions.forEach(({ id, label }) => {
          const opt = document.createElement('option');
          opt.value = String(id);
          opt.textContent = label;
          regionSelect.appendChild(opt);
        });
        regionSelect.addEventListener('change', () => {
          send({ type: 'select_region', region: Number(regionSelect.value) });
        });
      }

      async function initLegend() {
        const res = await fetch('/legend');
        const legend = await res.json(); // { title, unit, min, max, ticks, stops }
        const el = document.getElementById('legend');
        el.querySelector('.title').textContent = legend.title;
        el.querySelector('.unit').textContent = legend.unit;
        const ticks = el.querySelector('.ticks');
        legend.ticks.forEach(t => {
          const span = document.createElement('span');
          span.style.left = `${(100 * (t - legend.min)) / (legend.max - legend.min)}%`;
          span.textContent = t;
          ticks.appendChild(span);
        });
      }

      document.getElementById('fullscreen').addEventListener('click', () => {
        if (!document.fullscreenElement) {
          document.documentElement.requestFullscreen();
        } else if (document.exitFullscreen) {
          document.exitFullscreen();
        }
      });

      window.addEventListener('resize', () => {
        Object.values(panels).forEach(panel => panel.map.invalidateSize());
      });

      initRegions().then(connect).catch(console.error);
      initLegend().catch(console.error);
    </script>
  </body>
  </html>
"#;

pub(super) fn analytics_snippet(id: Option<&str>) -> String {
    match id.filter(|id| !id.trim().is_empty()) {
        Some(id) => format!(
            r#"<script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
    <script>
      window.dataLayer = window.dataLayer || [];
      function gtag() {{ dataLayer.push(arguments); }}
      gtag('js', new Date());
      gtag('config', '{id}', {{ page_path: window.location.pathname }});
    </script>"#
        ),
        None => String::new(),
    }
}

pub(super) fn render_page(basemap_url: &str, analytics_id: Option<&str>) -> String {
    INDEX_HTML
        .replace("{{BASEMAP_URL}}", basemap_url)
        .replace("{{ANALYTICS}}", &analytics_snippet(analytics_id))
}

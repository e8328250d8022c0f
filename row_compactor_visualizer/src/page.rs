// Single page UI. The slider sends every change; the server debounces.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Row Compactor</title>
<style>
  body { font-family: sans-serif; margin: 16px; }
  .controls { margin: 8px 0; display: flex; gap: 12px; align-items: center; }
  #status { font-family: monospace; font-size: 12px; color: #777; }
  #preview { max-width: 100%; border: 1px solid #444; }
</style>
</head>
<body>
<main>
  <h2>Row Compactor</h2>
  <div class="controls">
    <input id="file" type="file" accept="image/*">
    <label for="threshold">Max different pixels</label>
    <input id="threshold" type="range" min="0" max="100" value="5">
    <span id="threshold-value">5</span>
    <a id="download" style="display:none">Download</a>
    <span id="status">idle</span>
  </div>
  <img id="preview" alt="">
</main>
<script>
(function(){
  const status = (t)=>{ document.getElementById('status').textContent = t; };
  const fileInput = document.getElementById('file');
  const slider = document.getElementById('threshold');
  const sliderValue = document.getElementById('threshold-value');
  const preview = document.getElementById('preview');
  const download = document.getElementById('download');
  let pending = null;
  let lastUrl = null;

  const ws = new WebSocket((location.protocol==='https:'?'wss://':'ws://')+location.host+'/ws/preview');
  ws.binaryType = 'arraybuffer';
  ws.onopen = ()=> status('connected');
  ws.onclose = ()=> status('disconnected');

  const sendParams = ()=>{
    sliderValue.textContent = slider.value;
    if(ws.readyState !== WebSocket.OPEN) return;
    ws.send(JSON.stringify({type:'params', max_different_pixels: parseInt(slider.value, 10)}));
  };

  fileInput.onchange = async ()=>{
    const file = fileInput.files[0];
    if(!file) return;
    ws.send(JSON.stringify({type:'source', filename: file.name}));
    ws.send(await file.arrayBuffer());
    status('processing');
  };
  slider.oninput = ()=>{ sendParams(); status('processing'); };

  ws.onmessage = (ev)=>{
    if(ev.data instanceof ArrayBuffer){
      if(!pending) return;
      const blob = new Blob([ev.data], {type: pending.mime_type});
      if(lastUrl) URL.revokeObjectURL(lastUrl);
      lastUrl = URL.createObjectURL(blob);
      preview.src = lastUrl;
      download.href = lastUrl;
      download.download = pending.filename;
      download.style.display = '';
      status(pending.width+'x'+pending.height+' (was '+pending.width+'x'+pending.original_height+')');
      pending = null;
      return;
    }
    const msg = JSON.parse(ev.data);
    if(msg.type === 'result'){
      pending = msg;
    } else if(msg.type === 'empty'){
      status('no content rows left at this threshold');
    } else if(msg.type === 'error'){
      status('error: '+msg.message);
    }
  };
})();
</script>
</body>
</html>
"#;

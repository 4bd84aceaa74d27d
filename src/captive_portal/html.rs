//! Embedded HTML pages

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1, user-scalable=no">
<title>Free WiFi</title>
<style>
  body { font-family: Arial, sans-serif; padding: 20px; text-align: center; }
  input[type=text], input[type=email] { width: 100%; padding: 12px 20px; margin: 8px 0; display: inline-block; border: 1px solid #ccc; border-radius: 4px; box-sizing: border-box; font-size: 16px; }
  input.invalid { border-color: #e53935; }
  input[type=submit] { width: 100%; background-color: #4CAF50; color: white; padding: 14px 20px; margin: 8px 0; border: none; border-radius: 4px; cursor: pointer; }
  input[type=submit]:hover { background-color: #45a049; }
  input[type=submit]:disabled { background-color: #9e9e9e; cursor: not-allowed; }
  .wifi-logo { width: 64px; height: 64px; fill: #4CAF50; margin-bottom: 20px; }
</style>
</head>
<body>
<svg class="wifi-logo" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg">
  <path d="M12.01 21.49L23.64 7c-.45-.34-4.93-4-11.64-4C5.28 3 .81 6.66.36 7l11.63 14.49.01.01.01-.01z"/>
</svg>
<h2>Free WiFi</h2>
<h1>Fill below form to connect:</h1>
<form id="connect-form" action="/submit" method="POST">
  <label for="email">Email</label>
  <input type="email" id="email" name="email" placeholder="Your email.." autocomplete="email">
  <label for="name">Name</label>
  <input type="text" id="name" name="name" placeholder="Your name.." autocomplete="name">
  <input type="submit" id="submit-btn" value="Submit" disabled>
</form>
<script>
  const emailPattern = /^[^\s@]+@[^\s@]+\.[^\s@]+$/;
  const email = document.getElementById('email');
  const name = document.getElementById('name');
  const submitBtn = document.getElementById('submit-btn');

  function validate() {
    const emailOk = emailPattern.test(email.value.trim());
    const nameOk = name.value.trim().length > 0;
    email.classList.toggle('invalid', email.value.length > 0 && !emailOk);
    submitBtn.disabled = !(emailOk && nameOk);
  }

  email.addEventListener('input', validate);
  name.addEventListener('input', validate);
  validate();
</script>
</body>
</html>
"#;

pub const THANK_YOU_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>
html, body { height: 100%; margin: 0; padding: 0; background-color: #000; overflow: hidden; }
body { display: flex; justify-content: center; align-items: center; }
img { max-width: 100%; max-height: 100%; object-fit: contain; }
</style>
</head>
<body>

<img src="/monkey.jpg" alt="monkey">

</body>
</html>
"#;

//! Server-rendered pages.

use crate::models::{Library, User};

pub fn index(user_name: &str, libraries: &[Library]) -> String {
    let options: String = libraries
        .iter()
        .map(|library| {
            format!(
                r#"<option value="{}">{}</option>"#,
                escape_html(&library.id),
                escape_html(&library.name)
            )
        })
        .collect();

    let body = if libraries.is_empty() {
        r#"<p class="empty">No movie libraries found on this server.</p>"#.to_string()
    } else {
        format!(
            r#"<form id="picker">
  <label for="library">Library</label>
  <select id="library" name="library">{options}</select>
  <button type="submit">Pick a movie</button>
</form>
<section id="movie" hidden></section>"#
        )
    };

    page(
        "Jellyroll",
        &format!(
            r#"<header><h1>Jellyroll</h1><p>Signed in as {user} &middot; <a href="/setup">Settings</a></p></header>
{body}
<script src="/static/app.js"></script>"#,
            user = escape_html(user_name),
        ),
    )
}

pub fn setup_server() -> String {
    page(
        "Jellyroll setup",
        r#"<h1>Connect to Jellyfin</h1>
<form method="post" action="/setup/server">
  <label for="jellyfin_url">Server URL</label>
  <input id="jellyfin_url" name="jellyfin_url" type="url" placeholder="http://jellyfin:8096" required>
  <label for="api_key">API key</label>
  <input id="api_key" name="api_key" type="password" required>
  <button type="submit">Connect</button>
</form>"#,
    )
}

pub fn setup_user(users: &[User]) -> String {
    let choices: String = users
        .iter()
        .map(|user| {
            format!(
                r#"<form method="post" action="/setup/user" class="user">
  <input type="hidden" name="user_id" value="{id}">
  <input type="hidden" name="user_name" value="{name}">
  <button type="submit">{name}</button>
</form>
"#,
                id = escape_html(&user.id),
                name = escape_html(&user.name),
            )
        })
        .collect();

    page(
        "Jellyroll setup",
        &format!("<h1>Who is watching?</h1>\n{choices}"),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
</body>
</html>"#
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

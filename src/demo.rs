//! Demo application served by `webguard run`.
//!
//! Renders a small HTML form that carries the request's current `xsrf`
//! parameter as a hidden field, and lists whatever parameters were
//! submitted. Behind the pipeline this shows the whole flow: the first
//! `GET` receives a cookie and a matching token, a `POST` with the token is
//! echoed back, and a `POST` without it gets a 404.

use std::fmt::Write as _;
use std::io::Write as _;

use http::{header, StatusCode};

use crate::handler::{handler_fn, BoxHandler};
use crate::middleware::XSRF_PARAM_NAME;
use crate::request::Request;
use crate::strings_map::StringsMap;

#[must_use]
pub fn demo_app() -> BoxHandler {
    handler_fn(|req: &mut Request| {
        let page = render_page(req);
        let mut reply_header = StringsMap::headers();
        reply_header.set(header::CONTENT_TYPE.as_str(), "text/html; charset=utf-8");
        match req.respond(StatusCode::OK, reply_header) {
            Ok(mut body) => {
                if let Err(e) = body.write_all(page.as_bytes()) {
                    tracing::debug!(error = %e, "failed to write demo page");
                }
            }
            Err(e) => tracing::warn!(error = %e, "demo page not sent"),
        }
    })
}

#[must_use]
pub fn render_page(req: &Request) -> String {
    let token = escape_html(req.param.get_or(XSRF_PARAM_NAME, ""));
    let action = escape_html(req.url.path());

    let mut html = String::from("<!DOCTYPE html>\n<html><body>\n");
    let submitted: Vec<_> = req
        .param
        .iter()
        .filter(|(key, _)| *key != XSRF_PARAM_NAME)
        .collect();
    if !submitted.is_empty() {
        html.push_str("<ul>\n");
        for (key, value) in submitted {
            let _ = writeln!(html, "<li>{}: {}</li>", escape_html(key), escape_html(value));
        }
        html.push_str("</ul>\n");
    }
    let _ = write!(
        html,
        "<form method=\"post\" action=\"{action}\">\n\
         <input type=\"hidden\" name=\"{XSRF_PARAM_NAME}\" value=\"{token}\">\n\
         <input type=\"text\" name=\"message\">\n\
         <button type=\"submit\">Send</button>\n\
         </form>\n</body></html>\n"
    );
    html
}

#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

#[cfg(test)]
mod tests {
    use http::{Method, Uri};

    use super::*;
    use crate::respond::{Responder, ResponseBody};

    struct Discard;

    impl Responder for Discard {
        fn respond(self: Box<Self>, _: StatusCode, _: StringsMap) -> ResponseBody {
            Box::new(std::io::sink())
        }
    }

    #[test]
    fn page_embeds_token_and_escapes_params() {
        let mut req = Request::new(Method::POST, Uri::from_static("/guestbook"), Box::new(Discard));
        req.param.set("xsrf", "deadbeef");
        req.param.set("message", "<b>hi</b>");

        let page = render_page(&req);
        assert!(page.contains(r#"name="xsrf" value="deadbeef""#));
        assert!(page.contains(r#"action="/guestbook""#));
        assert!(page.contains("<li>message: &lt;b&gt;hi&lt;/b&gt;</li>"));
        assert!(!page.contains("<li>xsrf"));
    }
}

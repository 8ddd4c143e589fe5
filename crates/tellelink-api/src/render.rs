//! Minimal server-rendered pages for the public post route.

use html_escape::{encode_double_quoted_attribute, encode_text};

use tellelink_types::api::PublicPostResponse;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:36rem;margin:2rem auto;padding:0 1rem}\
a.button{display:block;margin:.75rem 0;padding:.9rem;border-radius:.5rem;text-align:center;\
color:#fff;background:#0f766e;text-decoration:none;font-weight:600}\
.badge{font-size:.75rem;margin-left:.5rem;padding:.1rem .4rem;border-radius:.25rem;background:#fef3c7;color:#92400e}\
footer{margin-top:2rem;font-size:.8rem;color:#666;text-align:center}";

const REPORT_ENDPOINT: &str = "/api/reports";

const REPORT_SCRIPT: &str = "document.getElementById('report-form').addEventListener('submit',async e=>{\
e.preventDefault();const f=e.target,s=document.getElementById('report'),out=document.getElementById('report-status');\
const body={post_id:s.dataset.postId,comment:f.comment.value,link_id:f.link_id.value||null,\
reporter_email:f.reporter_email.value||null};\
const r=await fetch(s.dataset.reportEndpoint,{method:'POST',headers:{'Content-Type':'application/json'},\
body:JSON.stringify(body)});\
if(r.ok){f.reset();out.textContent='Thanks, the report was sent.'}\
else{const j=await r.json().catch(()=>({}));out.textContent=j.error||'Could not send the report.'}});";

pub fn post_page(post: &PublicPostResponse) -> String {
    let mut buttons = String::new();
    for link in &post.links {
        buttons.push_str(&format!(
            "<a class=\"button\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" data-link-id=\"{}\">{}",
            encode_double_quoted_attribute(&link.url),
            link.id,
            encode_text(&link.button_name),
        ));
        if link.shortened {
            buttons.push_str("<span class=\"badge\">Shortened</span>");
        }
        buttons.push_str("</a>\n");
    }

    page(
        &post.title,
        &format!(
            "<h1>{}</h1>\n<main>\n{}</main>\n{}",
            encode_text(&post.title),
            buttons,
            report_form(post),
        ),
    )
}

/// Report form posting JSON to `/api/reports`. Without scripts the section
/// still names the endpoint.
fn report_form(post: &PublicPostResponse) -> String {
    let mut options = String::from("<option value=\"\">Whole post</option>");
    for link in &post.links {
        options.push_str(&format!(
            "<option value=\"{}\">{}</option>",
            link.id,
            encode_text(&link.button_name),
        ));
    }

    format!(
        "<section id=\"report\" data-post-id=\"{id}\" data-report-endpoint=\"{REPORT_ENDPOINT}\">\n\
         <h2>Report a problem</h2>\n\
         <form id=\"report-form\">\n\
         <label>Link <select name=\"link_id\">{options}</select></label>\n\
         <label>What is wrong? <textarea name=\"comment\" required maxlength=\"2000\"></textarea></label>\n\
         <label>Email (optional) <input type=\"email\" name=\"reporter_email\" maxlength=\"254\"></label>\n\
         <button type=\"submit\">Send report</button>\n\
         <p id=\"report-status\" role=\"status\"></p>\n\
         </form>\n\
         <noscript><p>Reports can also be sent as JSON to <code>POST {REPORT_ENDPOINT}</code>.</p></noscript>\n\
         </section>\n<script>{REPORT_SCRIPT}</script>",
        id = post.id,
    )
}

pub fn not_found_page() -> String {
    page(
        "Post not found",
        "<h1>Post not found</h1>\n<p>This post does not exist or has been removed.</p>",
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n<footer>Powered by tellelink</footer>\n</body>\n</html>\n",
        encode_text(title),
        STYLE,
        body,
    )
}

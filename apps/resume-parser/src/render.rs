//! HTML pages served by the upload flow.

use std::fmt::Write;

use html_escape::encode_text;

use crate::models::ExtractionResult;

/// Landing page for GET /. One file input named `file`.
pub const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Resume Parser</title></head>
<body>
<h1>Resume Parser</h1>
<form action="/upload" method="POST" enctype="multipart/form-data">
    <input type="file" name="file" accept="application/pdf">
    <input type="submit" value="Upload Resume">
</form>
</body>
</html>
"#;

/// Renders the extraction result. Missing phone/email render as empty.
pub fn extraction_page(result: &ExtractionResult) -> String {
    let email = result.contact.email.as_deref().unwrap_or_default();
    let phone = result.contact.phone.as_deref().unwrap_or_default();

    let mut html = String::with_capacity(1024);
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Extracted Information</title></head>\n<body>\n",
    );
    html.push_str("<h1>Extracted Information</h1>\n");
    html.push_str("<p><strong>Name:</strong> Could not extract (requires advanced NLP)</p>\n");
    // Writing into a String is infallible.
    let _ = writeln!(html, "<p><strong>Email:</strong> {}</p>", encode_text(email));
    let _ = writeln!(html, "<p><strong>Phone:</strong> {}</p>", encode_text(phone));

    html.push_str("\n<h2>Education</h2>\n");
    push_list(&mut html, &result.entities.education);

    html.push_str("\n<h2>Work Experience</h2>\n");
    push_list(&mut html, &result.entities.work_experience);

    html.push_str("\n<a href=\"/\">Upload Another Resume</a>\n</body>\n</html>\n");
    html
}

fn push_list(html: &mut String, items: &[String]) {
    html.push_str("<ul>\n");
    for item in items {
        let _ = writeln!(html, "  <li>{}</li>", encode_text(item));
    }
    html.push_str("</ul>\n");
}

//! Minimal `multipart/mixed` builder: one plain-text part and one binary
//! attachment, which is all the mailer needs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Line length for base64 bodies (RFC 2045).
const WRAP: usize = 76;

pub struct Attachment<'a> {
    pub file_name: &'a str,
    pub data: &'a [u8],
}

pub struct Message<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub attachment: Option<Attachment<'a>>,
}

impl Message<'_> {
    /// Render the message with CRLF line endings. `boundary` must not occur
    /// in the body text.
    pub fn render(&self, boundary: &str) -> String {
        let mut out = String::new();
        push_header(&mut out, "To", &single_line(self.to));
        push_header(&mut out, "From", "me");
        push_header(&mut out, "Subject", &encode_header(self.subject));
        push_header(&mut out, "MIME-Version", "1.0");
        push_header(
            &mut out,
            "Content-Type",
            &format!("multipart/mixed; boundary=\"{boundary}\""),
        );
        out.push_str("\r\n");

        out.push_str(&format!("--{boundary}\r\n"));
        push_header(&mut out, "Content-Type", "text/plain; charset=\"utf-8\"");
        push_header(&mut out, "Content-Transfer-Encoding", "8bit");
        out.push_str("\r\n");
        out.push_str(&crlf(self.body));
        out.push_str("\r\n");

        if let Some(att) = &self.attachment {
            let name = single_line(att.file_name).replace('"', "");
            out.push_str(&format!("--{boundary}\r\n"));
            push_header(&mut out, "Content-Type", "application/octet-stream");
            push_header(
                &mut out,
                "Content-Disposition",
                &format!("attachment; filename=\"{name}\""),
            );
            push_header(&mut out, "Content-Transfer-Encoding", "base64");
            out.push_str("\r\n");
            let encoded = STANDARD.encode(att.data);
            for chunk in encoded.as_bytes().chunks(WRAP) {
                // base64 output is ASCII
                out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
                out.push_str("\r\n");
            }
        }

        out.push_str(&format!("--{boundary}--\r\n"));
        out
    }
}

/// A boundary string unlikely to appear in any body.
pub fn new_boundary() -> String {
    format!("=_casegen_{}", uuid::Uuid::new_v4().simple())
}

/// RFC 2047 encoded-word for non-ASCII header values.
pub fn encode_header(value: &str) -> String {
    let value = single_line(value);
    if value.is_ascii() {
        value
    } else {
        format!("=?utf-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn push_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\r\n");
}

/// Header values may not carry line breaks.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

fn crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

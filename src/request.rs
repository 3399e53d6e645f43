//! Request payload sent by the probe.
//!
//! The probe speaks to a forward proxy, so the request line carries the
//! absolute URI of the remote host. Header order and casing are fixed and
//! go out on the wire byte for byte.

use bytes::Bytes;

/// Request template. Both `{host}` placeholders take the same value.
macro_rules! request_template {
    () => {
        concat!(
            "GET http://{host}/ HTTP/1.1\r\n",
            "Host: {host}\r\n",
            "Cache-Control: max-age=0\r\n",
            "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8\r\n",
            "User-Agent: Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
            "(KHTML, like Gecko) Chrome/29.0.1547.62 Safari/537.36\r\n",
            "Accept-Language: en-US,en;q=0.8,zh-CN;q=0.6,zh;q=0.4\r\n",
            "\r\n",
        )
    };
}

/// Raw template text, with placeholders unsubstituted.
#[cfg(test)]
const REQUEST_TEMPLATE: &str = request_template!();

/// Build the request bytes for `remote_host`.
pub fn build_request(remote_host: &str) -> Bytes {
    Bytes::from(format!(request_template!(), host = remote_host))
}

//! Reason phrases for standard HTTP status codes.

/// Canonical reason phrase for `code`, or `""` when the code is not listed.
pub const fn status_code_message(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        306 => "(Unused)",
        307 => "Temporary Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_reason_phrases() {
        assert_eq!(status_code_message(404), "Not Found");
        assert_eq!(status_code_message(200), "OK");
        assert_eq!(status_code_message(306), "(Unused)");
        assert_eq!(status_code_message(505), "HTTP Version Not Supported");
    }

    #[test]
    fn unlisted_codes_are_empty() {
        assert_eq!(status_code_message(999), "");
        assert_eq!(status_code_message(418), "");
        assert_eq!(status_code_message(0), "");
    }

    #[test]
    fn every_listed_range_is_covered() {
        let ranges = [100..=101, 200..=206, 300..=307, 400..=417, 500..=505];
        for code in ranges.into_iter().flatten() {
            assert!(!status_code_message(code).is_empty(), "missing phrase for {code}");
        }
    }
}

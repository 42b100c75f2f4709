/// Compose a flash message HTML snippet for known admin status or error codes.
pub fn compose_flash_message(status: Option<&str>, error: Option<&str>) -> String {
    if let Some(status) = status {
        let message = match status {
            "created" => "Scholarship created.",
            "updated" => "Scholarship updated.",
            _ => "",
        };

        if !message.is_empty() {
            return format!(r#"<div class="flash success">{message}</div>"#);
        }
    }

    if let Some(error) = error {
        let message = match error {
            "not_found" => "That scholarship no longer exists.",
            _ => "Something went wrong. Check the server logs.",
        };

        return format!(r#"<div class="flash error">{message}</div>"#);
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_without_error_is_silent() {
        assert_eq!(compose_flash_message(Some("bogus"), None), "");
        assert_eq!(compose_flash_message(None, None), "");
    }

    #[test]
    fn unknown_error_falls_back_to_generic_message() {
        assert!(compose_flash_message(None, Some("???")).contains("server logs"));
        assert!(compose_flash_message(None, Some("upload_failed")).contains("server logs"));
    }

    #[test]
    fn not_found_error_has_its_own_message() {
        assert!(compose_flash_message(None, Some("not_found")).contains("no longer exists"));
    }
}

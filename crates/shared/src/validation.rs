use crate::constants::*;

pub fn validate_chirp_content(content: &str) -> Result<(), String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("Chirp content is required".into());
    }
    if trimmed.chars().count() > MAX_CHIRP_LENGTH {
        return Err(format!(
            "Chirp must be at most {} characters",
            MAX_CHIRP_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_handle(handle: &str) -> Result<(), String> {
    if handle.len() < MIN_HANDLE_LENGTH {
        return Err(format!(
            "Handle must be at least {} characters",
            MIN_HANDLE_LENGTH
        ));
    }
    if handle.len() > MAX_HANDLE_LENGTH {
        return Err(format!(
            "Handle must be at most {} characters",
            MAX_HANDLE_LENGTH
        ));
    }
    // Only allow lowercase alphanumeric and underscores
    if !handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(
            "Handle can only contain lowercase letters, numbers, and underscores".into(),
        );
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), String> {
    if bio.chars().count() > MAX_BIO_LENGTH {
        return Err(format!("Bio must be at most {} characters", MAX_BIO_LENGTH));
    }
    Ok(())
}

pub fn validate_emoji(emoji: &str) -> Result<(), String> {
    if emoji.is_empty() {
        return Err("Emoji is required".into());
    }
    if emoji.len() > MAX_EMOJI_LENGTH {
        return Err("Invalid emoji".into());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

//! Pulling media out of GraphQL response bodies

use serde_json::Value;

use super::Media;
use crate::error::ApiError;

/// Extract `data.Page.media` from a response body.
pub fn parse_page(body: &Value) -> Result<Vec<Media>, ApiError> {
    let media = body
        .pointer("/data/Page/media")
        .ok_or_else(|| ApiError::InvalidResponse("Response has no data.Page.media".into()))?;

    serde_json::from_value(media.clone())
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse media list: {}", e)))
}

/// Extract `data.Media` from a response body; `null` means no match.
pub fn parse_media(body: &Value) -> Result<Option<Media>, ApiError> {
    match body.pointer("/data/Media") {
        None | Some(Value::Null) => Ok(None),
        Some(media) => serde_json::from_value(media.clone())
            .map(Some)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse media: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_page() {
        let body = json!({"data": {"Page": {"media": [
            {"id": 1, "title": {"romaji": "A"}},
            {"id": 2, "title": {"romaji": "B"}}
        ]}}});

        let media = parse_page(&body).unwrap();
        assert_eq!(media.len(), 2);
        assert_eq!(media[1].display_title(), "B");
    }

    #[test]
    fn test_parse_page_missing_path() {
        let err = parse_page(&json!({"data": {}})).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_media_null_is_none() {
        assert_eq!(parse_media(&json!({"data": {"Media": null}})).unwrap(), None);
    }

    #[test]
    fn test_parse_media() {
        let body = json!({"data": {"Media": {"id": 20, "episodes": 220}}});
        let media = parse_media(&body).unwrap().unwrap();
        assert_eq!(media.id, 20);
        assert_eq!(media.episodes, Some(220));
    }
}

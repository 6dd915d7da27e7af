//! Request bodies as the story service expects them.

use serde::Serialize;
use storyloom_core::GenerationRequest;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub(crate) enum GenerationBody<'a> {
    Opening {
        theme: &'a str,
        improvisations: &'a [String],
        story_id: &'a str,
    },
    Continuation {
        story_id: &'a str,
        improv: &'a str,
    },
}

impl<'a> From<&'a GenerationRequest> for GenerationBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        match request {
            GenerationRequest::Opening {
                theme,
                prior_improvisations,
                session_id,
            } => Self::Opening {
                theme,
                improvisations: prior_improvisations,
                story_id: session_id,
            },
            GenerationRequest::Continuation {
                session_id,
                improvisation,
            } => Self::Continuation {
                story_id: session_id,
                improv: improvisation,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SpeechBody<'a> {
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_opening_body_field_names() {
        let request = GenerationRequest::Opening {
            theme: "the sea".to_string(),
            prior_improvisations: vec!["a whale".to_string()],
            session_id: "abc".to_string(),
        };
        let value = serde_json::to_value(GenerationBody::from(&request)).unwrap();
        assert_eq!(
            value,
            json!({"theme": "the sea", "improvisations": ["a whale"], "story_id": "abc"})
        );
    }

    #[test]
    fn test_continuation_body_field_names() {
        let request = GenerationRequest::Continuation {
            session_id: "abc".to_string(),
            improvisation: "it sings".to_string(),
        };
        let value = serde_json::to_value(GenerationBody::from(&request)).unwrap();
        assert_eq!(value, json!({"story_id": "abc", "improv": "it sings"}));
    }
}

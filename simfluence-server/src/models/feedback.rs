//! Simulation feedback inputs: agent reactions, summaries, post suggestions

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::validation::{optional_text, required_text};
use super::ValidationError;

const MAX_AGENT_NAME_LEN: usize = 128;
const MAX_ACTION_LEN: usize = 64;
const MAX_SENTIMENT_LEN: usize = 64;
const MAX_REASON_LEN: usize = 4_000;
const MAX_SUMMARY_LEN: usize = 20_000;
const MAX_SUGGESTION_LEN: usize = 4_000;

/// Raw `POST /agentReaction` payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReactionInput {
    pub simulation_id: Option<Uuid>,
    pub agent_name: Option<String>,
    pub action: Option<String>,
    pub reason: Option<String>,
    pub sentiment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAgentReaction {
    pub simulation_id: Uuid,
    pub agent_name: String,
    pub action: String,
    pub reason: Option<String>,
    pub sentiment: Option<String>,
}

impl AgentReactionInput {
    pub fn validate(self) -> Result<NewAgentReaction, ValidationError> {
        Ok(NewAgentReaction {
            simulation_id: self
                .simulation_id
                .ok_or(ValidationError::Empty { field: "simulationId" })?,
            agent_name: required_text("agentName", self.agent_name.as_deref(), MAX_AGENT_NAME_LEN)?,
            action: required_text("action", self.action.as_deref(), MAX_ACTION_LEN)?,
            reason: optional_text("reason", self.reason.as_deref(), MAX_REASON_LEN)?,
            sentiment: optional_text("sentiment", self.sentiment.as_deref(), MAX_SENTIMENT_LEN)?,
        })
    }
}

/// Raw `POST /summary` payload. The JSON blobs are stored as sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    pub simulation_id: Option<Uuid>,
    pub summary_text: Option<String>,
    pub tone_cloud: Option<Value>,
    pub tone_breakdown: Option<Value>,
    pub section_feedback: Option<Value>,
    pub engagement_data: Option<Value>,
    pub audience_match: Option<f64>,
    pub feedback_score: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewSummary {
    pub simulation_id: Uuid,
    pub summary_text: String,
    pub tone_cloud: Option<Value>,
    pub tone_breakdown: Option<Value>,
    pub section_feedback: Option<Value>,
    pub engagement_data: Option<Value>,
    pub audience_match: Option<f64>,
    pub feedback_score: Option<f64>,
}

impl SummaryInput {
    pub fn validate(self) -> Result<NewSummary, ValidationError> {
        Ok(NewSummary {
            simulation_id: self
                .simulation_id
                .ok_or(ValidationError::Empty { field: "simulationId" })?,
            summary_text: required_text("summaryText", self.summary_text.as_deref(), MAX_SUMMARY_LEN)?,
            // explicit JSON null is the same as absent
            tone_cloud: self.tone_cloud.filter(|v| !v.is_null()),
            tone_breakdown: self.tone_breakdown.filter(|v| !v.is_null()),
            section_feedback: self.section_feedback.filter(|v| !v.is_null()),
            engagement_data: self.engagement_data.filter(|v| !v.is_null()),
            audience_match: self.audience_match,
            feedback_score: self.feedback_score,
        })
    }
}

/// Raw `POST /postSuggestion` payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSuggestionInput {
    pub simulation_id: Option<Uuid>,
    pub suggestion_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPostSuggestion {
    pub simulation_id: Uuid,
    pub suggestion_text: String,
}

impl PostSuggestionInput {
    pub fn validate(self) -> Result<NewPostSuggestion, ValidationError> {
        Ok(NewPostSuggestion {
            simulation_id: self
                .simulation_id
                .ok_or(ValidationError::Empty { field: "simulationId" })?,
            suggestion_text: required_text(
                "suggestionText",
                self.suggestion_text.as_deref(),
                MAX_SUGGESTION_LEN,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reaction_requires_agent_and_action() {
        let input: AgentReactionInput = serde_json::from_value(json!({
            "simulationId": Uuid::new_v4(),
            "agentName": "Skeptical Sam",
            "action": ""
        }))
        .unwrap();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::Empty { field: "action" })
        ));
    }

    #[test]
    fn reaction_optional_fields() {
        let input: AgentReactionInput = serde_json::from_value(json!({
            "simulationId": Uuid::new_v4(),
            "agentName": "Skeptical Sam",
            "action": "comment",
            "sentiment": "negative"
        }))
        .unwrap();
        let reaction = input.validate().unwrap();
        assert_eq!(reaction.sentiment.as_deref(), Some("negative"));
        assert!(reaction.reason.is_none());
    }

    #[test]
    fn summary_keeps_json_blobs() {
        let input: SummaryInput = serde_json::from_value(json!({
            "simulationId": Uuid::new_v4(),
            "summaryText": "Mostly positive",
            "engagementData": {"impressions": 8500, "likes": 750, "comments": 120},
            "toneCloud": null,
            "feedbackScore": 8.5
        }))
        .unwrap();
        let summary = input.validate().unwrap();
        assert_eq!(summary.engagement_data.unwrap()["likes"], 750);
        assert!(summary.tone_cloud.is_none());
        assert_eq!(summary.feedback_score, Some(8.5));
    }

    #[test]
    fn suggestion_requires_simulation() {
        let input = PostSuggestionInput {
            simulation_id: None,
            suggestion_text: Some("Add a hook".into()),
        };
        assert!(matches!(
            input.validate(),
            Err(ValidationError::Empty { field: "simulationId" })
        ));
    }
}

use crate::client::models::{Analysis, Significance};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightCard {
    pub title: String,
    pub description: String,
    pub significance: Significance,
    pub color: &'static str,
}

/// The narrative half of a result. Suggested questions are rendered as
/// controls that post back to the follow-up handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightPanel {
    pub headline: String,
    pub insights: Vec<InsightCard>,
    pub explanation: String,
    pub suggested_questions: Vec<String>,
}

impl InsightPanel {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self {
            headline: analysis.headline.clone(),
            insights: analysis
                .insights
                .iter()
                .map(|insight| InsightCard {
                    title: insight.title.clone(),
                    description: insight.description.clone(),
                    significance: insight.significance,
                    color: insight.significance.color(),
                })
                .collect(),
            explanation: analysis.explanation.clone(),
            suggested_questions: analysis.suggested_questions.clone(),
        }
    }
}

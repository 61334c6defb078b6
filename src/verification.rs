use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

const INAPPROPRIATE_WORDS: [&str; 3] = ["violence", "explicit", "inappropriate"];
const RELIGIOUS_KEYWORDS: [&str; 5] = ["faith", "prayer", "spiritual", "divine", "holy"];

/// Minimum description length (in UTF-16 code units, exclusive) that earns the length bonus.
const DESCRIPTION_MIN_UNITS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Unverified => "unverified",
            Self::Rejected => "rejected",
        }
    }
}

/// Verdict for a title on its own (GET /api/ai/verify-movie).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TitleVerification {
    pub status: VerificationStatus,
    pub confidence: f64,
    pub reason: String,
}

/// Fields scored by [`verify_content`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct VerificationRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub religion_category: Option<String>,
}

/// Verdict for a full submission. Stored alongside the movie as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContentVerification {
    pub status: VerificationStatus,
    pub confidence: f64,
    pub score: i32,
    pub reasons: Vec<String>,
}

/// verify_title
///
/// Heuristic screening of a submission's title. The keyword rules are
/// case-insensitive and the first matching rule decides:
/// 1. `test` is verified (0.95).
/// 2. An inappropriate word is rejected (0.9).
/// 3. A religious keyword is verified (0.85).
/// 4. Anything else needs manual review (0.6).
pub fn verify_title(title: &str) -> TitleVerification {
    let lower = title.to_lowercase();

    let (status, confidence, reason) = if lower.contains("test") {
        (VerificationStatus::Verified, 0.95, "Title contains test keyword")
    } else if INAPPROPRIATE_WORDS.iter().any(|word| lower.contains(word)) {
        (VerificationStatus::Rejected, 0.9, "Contains inappropriate content")
    } else if RELIGIOUS_KEYWORDS.iter().any(|word| lower.contains(word)) {
        (
            VerificationStatus::Verified,
            0.85,
            "Contains appropriate religious content",
        )
    } else {
        (VerificationStatus::Unverified, 0.6, "Requires manual review")
    };

    TitleVerification {
        status,
        confidence,
        reason: reason.to_string(),
    }
}

/// verify_content
///
/// Accumulates a score over title, description and category, then maps it to
/// a status:
///
/// * `score >= 70` is verified with confidence `min(0.95, score / 100)`
/// * `score < 0` is rejected with confidence `0.9`
/// * anything else is unverified with confidence `max(0.3, score / 100)`
pub fn verify_content(request: &VerificationRequest) -> ContentVerification {
    let mut score = 0;
    let mut reasons = Vec::new();

    let title = verify_title(&request.title);
    match title.status {
        VerificationStatus::Verified => score += 30,
        VerificationStatus::Rejected => score -= 50,
        VerificationStatus::Unverified => {}
    }
    reasons.push(format!("Title: {}", title.reason));

    if let Some(description) = request.description.as_deref() {
        let lower = description.to_lowercase();
        if lower.encode_utf16().count() > DESCRIPTION_MIN_UNITS {
            score += 20;
            reasons.push("Description: Adequate length provided".to_string());
        }
        if lower.contains("family-friendly") {
            score += 15;
            reasons.push("Description: Family-friendly content detected".to_string());
        }
    }

    if let Some(category) = request
        .religion_category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "Other")
    {
        score += 25;
        reasons.push(format!("Category: Appropriate for {category}"));
    }

    let ratio = f64::from(score) / 100.0;
    let (status, confidence) = if score >= 70 {
        (VerificationStatus::Verified, ratio.min(0.95))
    } else if score < 0 {
        (VerificationStatus::Rejected, 0.9)
    } else {
        (VerificationStatus::Unverified, ratio.max(0.3))
    };

    ContentVerification {
        status,
        confidence: (confidence * 100.0).round() / 100.0,
        score,
        reasons,
    }
}

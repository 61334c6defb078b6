use movie_portal::verification::{
    VerificationRequest, VerificationStatus, verify_content, verify_title,
};

fn request(title: &str, description: Option<&str>, category: Option<&str>) -> VerificationRequest {
    VerificationRequest {
        title: title.to_string(),
        description: description.map(str::to_string),
        religion_category: category.map(str::to_string),
    }
}

// --- verify_title ---

#[test]
fn test_title_rules_first_match_wins() {
    // "test" is checked before the inappropriate list.
    let verdict = verify_title("Violent TEST Footage");
    assert_eq!(verdict.status, VerificationStatus::Verified);
    assert_eq!(verdict.confidence, 0.95);
    assert_eq!(verdict.reason, "Title contains test keyword");

    // Inappropriate wins over religious keywords.
    let verdict = verify_title("Holy Violence");
    assert_eq!(verdict.status, VerificationStatus::Rejected);
    assert_eq!(verdict.confidence, 0.9);
    assert_eq!(verdict.reason, "Contains inappropriate content");
}

#[test]
fn test_title_religious_and_neutral() {
    let verdict = verify_title("Evening Prayer");
    assert_eq!(verdict.status, VerificationStatus::Verified);
    assert_eq!(verdict.confidence, 0.85);
    assert_eq!(verdict.reason, "Contains appropriate religious content");

    let verdict = verify_title("Harbour Lights");
    assert_eq!(verdict.status, VerificationStatus::Unverified);
    assert_eq!(verdict.confidence, 0.6);
    assert_eq!(verdict.reason, "Requires manual review");
}

// --- verify_content ---

#[test]
fn test_every_bonus_applies() {
    let result = verify_content(&request(
        "Spiritual Roots",
        Some("A family-friendly documentary following three generations of one parish."),
        Some("Christianity"),
    ));

    assert_eq!(result.score, 90);
    assert_eq!(result.status, VerificationStatus::Verified);
    assert_eq!(result.confidence, 0.9);
    assert_eq!(
        result.reasons,
        vec![
            "Title: Contains appropriate religious content",
            "Description: Adequate length provided",
            "Description: Family-friendly content detected",
            "Category: Appropriate for Christianity",
        ]
    );
}

#[test]
fn test_threshold_seventy_is_verified() {
    // 30 + 15 + 25 = 70 with a short description.
    let result = verify_content(&request(
        "Divine Mercy",
        Some("family-friendly"),
        Some("Hinduism"),
    ));

    assert_eq!(result.score, 70);
    assert_eq!(result.status, VerificationStatus::Verified);
    assert_eq!(result.confidence, 0.7);
}

#[test]
fn test_negative_score_is_rejected() {
    let result = verify_content(&request("Explicit Cut", None, None));

    assert_eq!(result.score, -50);
    assert_eq!(result.status, VerificationStatus::Rejected);
    assert_eq!(result.confidence, 0.9);
}

#[test]
fn test_bonuses_can_lift_rejected_title_out_of_rejection() {
    // -50 + 20 + 15 + 25 = 10: not rejected any more.
    let result = verify_content(&request(
        "Inappropriate Jokes",
        Some("A family-friendly comedy special filmed live before a very large audience."),
        Some("Judaism"),
    ));

    assert_eq!(result.score, 10);
    assert_eq!(result.status, VerificationStatus::Unverified);
    assert_eq!(result.confidence, 0.3);
}

#[test]
fn test_middle_scores_are_unverified() {
    let result = verify_content(&request("Harbour Lights", None, Some("Sikhism")));
    assert_eq!(result.score, 25);
    assert_eq!(result.status, VerificationStatus::Unverified);
    assert_eq!(result.confidence, 0.3);

    let result = verify_content(&request("Holy Week", None, Some("Islam")));
    assert_eq!(result.score, 55);
    assert_eq!(result.confidence, 0.55);
}

#[test]
fn test_other_and_empty_categories_earn_nothing() {
    assert_eq!(verify_content(&request("Harbour Lights", None, Some("Other"))).score, 0);
    assert_eq!(verify_content(&request("Harbour Lights", None, Some(""))).score, 0);
}

#[test]
fn test_description_length_is_strictly_more_than_fifty_chars() {
    let fifty = "x".repeat(50);
    let fifty_one = "x".repeat(51);

    assert_eq!(verify_content(&request("Harbour", Some(&fifty), None)).score, 0);
    assert_eq!(verify_content(&request("Harbour", Some(&fifty_one), None)).score, 20);
}

#[test]
fn test_status_serializes_lowercase() {
    let json = serde_json::to_value(verify_title("Harbour Lights")).unwrap();
    assert_eq!(json["status"], "unverified");
    assert_eq!(VerificationStatus::Rejected.as_str(), "rejected");
}

#[test]
fn test_description_length_counts_utf16_units() {
    // 25 emoji are 25 chars but 50 UTF-16 units: not enough.
    let twenty_five = "\u{1F3AC}".repeat(25);
    // 26 emoji are 52 UTF-16 units: enough, though only 26 chars.
    let twenty_six = "\u{1F3AC}".repeat(26);

    assert_eq!(verify_content(&request("Harbour", Some(&twenty_five), None)).score, 0);
    assert_eq!(verify_content(&request("Harbour", Some(&twenty_six), None)).score, 20);
}

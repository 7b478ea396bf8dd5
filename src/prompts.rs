//! Task prompts sent to the Bedrock agent alongside the extracted claim text.

/// Initial analysis run when the user clicks "Analyze Claim".
pub const ANALYZE_CLAIM: &str =
    "Analyze this medical claim for potential Fraud, Waste, and Abuse. Provide a detailed report.";

pub const EXPLAIN_REJECTION: &str =
    "Explain why this claim might be rejected and suggest resolution steps.";

pub const RISK_SCORE: &str =
    "Assign a risk score (0-100) for Fraud, Waste, and Abuse. Justify the score.";

pub const SUGGEST_CORRECTIONS: &str =
    "Suggest corrections to improve claim approval chances.";

pub const FULL_REPORT: &str = "\
Please generate a comprehensive analysis report for the following medical claim.
Include:
1. Summary of the claim
2. Any detected issues (Fraud, Waste, Abuse)
3. Risk score (0-100) with justification
4. Reasons for potential rejection
5. Suggested corrections
6. Likelihood of approval
Format the report clearly with headings.";

pub const CLAIM_METADATA: &str =
    "Extract key metadata from this claim: patient name, provider, date of service, claim amount, diagnosis codes.";

use claimcheck_common::TimeRange;

pub const VERIFICATION_SYSTEM_PROMPT: &str = "You are an AI assistant specialized in verifying health influencer identities and analyzing their market presence.";

/// Ask the oracle whether `handle` is a legitimate health influencer, with
/// identity details when it is.
pub fn verification_prompt(handle: &str) -> String {
    format!(
        r#"Task: Analyze if "{handle}" is a legitimate health influencer and provide detailed information in the specified JSON format.

Follow these rules:
1. Determine if "{handle}" is a verified health influencer and respond with a boolean value for 'isHealthInfluencer'.
2. If 'isHealthInfluencer' is false, provide a concise reason (max 400 characters) explaining why they are not considered a health influencer and respond only with:
   {{
     "isHealthInfluencer": false,
     "reason": "Explain why they are not considered a health influencer"
   }}
3. If 'isHealthInfluencer' is true, provide detailed information in the 'details' object, including:
   - handle: primary social media handle
   - mainName: full recognized name
   - description: concise description (max 400 characters) highlighting credentials and focus
   - aliases: list of known aliases/handles
   - contentTags: exactly 10 specific tags describing content focus
   - yearlyRevenueUsd: estimated yearly revenue in USD (as an integer number)
   - totalFollowers: total followers across all platforms (as an integer number)

Ensure responses adhere strictly to the specified JSON format.

Example responses:

Not a health influencer:

{{
  "isHealthInfluencer": false,
  "reason": "This account appears to be a gaming content creator with no focus on health-related topics"
}}

Valid health influencer:

{{
  "isHealthInfluencer": true,
  "details": {{
    "handle": "hubermanlab",
    "mainName": "Andrew Huberman",
    "description": "Stanford Professor of Neurobiology and Ophthalmology. Host of the Huberman Lab Podcast, translating neuroscience into practical tools for everyday life.",
    "aliases": ["hubermanlab", "andrewhuberman", "hubermanandrew"],
    "contentTags": ["neuroscience", "sleep", "hormones", "performance", "stress-management", "exercise", "mental-health", "nutrition", "circadian-rhythm", "productivity"],
    "yearlyRevenueUsd": 5000000,
    "totalFollowers": 4200000
  }}
}}"#
    )
}

/// Ask the oracle for exactly `count` distinct claims by `handle` within
/// `time_range`, cross-referenced only against `journals`.
pub fn claims_prompt(handle: &str, time_range: TimeRange, count: u32, journals: &[&str]) -> String {
    let journals = journals.join(", ");
    format!(
        r#"Analyze the health-related content from "{handle}" within the {time_range} and extract exactly {count} most significant health claims without duplicates.

Follow these rules:
1. Focus on specific, verifiable health claims
2. Cross-reference exclusively with the following journals: {journals}
3. Format each claim in JSON with these fields:
   - claim: the health claim text
   - category: one of [Nutrition, Medicine, Mental Health, Fitness, Alternative Medicine, General Wellness]
   - source: where the claim was found
   - date: approximate date of the claim within {time_range}
   - verificationStatus: Verified/Questionable/Debunked based on the provided journals references and consensus
   - journalsVerified: list of the provided cross-referenced journals that verify the claim (if any)
   - journalsQuestioned: list of the provided cross-referenced journals that question the claim (if any)
   - journalsDebunked: list of the provided cross-referenced journals that debunk the claim (if any)
   - score: Calculate a credibility score (0-1) based on the claim's verification status and general journal consensus

Respond with ONLY a JSON array of {count} claims.
Example format:
[
  {{
    "claim": "Vitamin D supplementation boosts immune system",
    "category": "Nutrition",
    "source": "Twitter post",
    "date": "2024-01-02",
    "verificationStatus": "Verified",
    "journalsVerified": ["PubMed Central", "Nature"],
    "journalsQuestioned": ["ScienceDirect"],
    "journalsDebunked": [],
    "score": 0.75
  }}
]"#
    )
}

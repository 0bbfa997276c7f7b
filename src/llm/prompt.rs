// Prompt templates for matchup betting insights.
//
// Constructs compact, structured prompts for the Claude API from the two
// teams' adjusted efficiency numbers. The pre-computed values are included
// directly so the LLM focuses on interpretation rather than arithmetic.

use crate::matchup::TeamRecord;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// One team's numeric profile extracted from the summary dataset. A metric
/// that is absent or non-numeric carries `None` and renders as "n/a"; the
/// prompt still goes out with whatever numbers exist.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamProfile {
    pub team: String,
    pub metrics: Vec<(String, Option<f64>)>,
}

/// Extract a team's profile for the given metrics from its summary row.
pub fn team_profile(record: &TeamRecord, dataset: &str, metrics: &[String]) -> TeamProfile {
    let entry = record.get(dataset);
    let values = metrics
        .iter()
        .map(|metric| {
            let value = entry
                .and_then(|e| e.row.get(metric))
                .and_then(|v| v.as_number());
            (metric.clone(), value)
        })
        .collect();

    TeamProfile {
        team: record.team.clone(),
        metrics: values,
    }
}

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Return the static system prompt for all matchup insight calls.
pub fn system_prompt() -> String {
    "You are a college basketball matchup analyst advising a bettor.\n\
     \n\
     You receive two teams' adjusted efficiency numbers (KenPom-style): \
     AdjOE (points scored per 100 possessions, adjusted), AdjDE (points \
     allowed per 100 possessions, adjusted, lower is better), AdjTempo \
     (possessions per 40 minutes), and AdjEM (net efficiency margin).\n\
     \n\
     For each matchup, provide:\n\
     1. EDGE: which team the numbers favor and by how much\n\
     2. PACE: how the tempo clash shapes the game\n\
     3. KEY FACTORS: the two or three stats that decide this one\n\
     4. LEAN: a one-line betting angle with appropriate uncertainty\n\
     \n\
     Be concise and direct. Use ONLY the numbers provided \u{2014} do not invent \
     statistics or recall records from memory. Note when a number is missing. \
     This is informational analysis, not a guarantee."
        .to_string()
}

// ---------------------------------------------------------------------------
// Insight prompt
// ---------------------------------------------------------------------------

/// Build the insight prompt for a compared matchup.
///
/// Includes both teams' efficiency profiles and the list of datasets the
/// comparison covered, so the model knows what evidence backs the numbers.
pub fn build_insight_prompt(
    profile_a: &TeamProfile,
    profile_b: &TeamProfile,
    datasets_compared: &[String],
) -> String {
    let mut prompt = String::with_capacity(1024);

    // Section 1: MATCHUP header
    prompt.push_str(&format!(
        "## MATCHUP\n{} vs {}\n\n",
        profile_a.team, profile_b.team
    ));

    // Section 2: EFFICIENCY PROFILES
    prompt.push_str("## EFFICIENCY PROFILES\n");
    prompt.push_str(&format_profile(profile_a));
    prompt.push_str(&format_profile(profile_b));
    prompt.push('\n');

    // Section 3: DATASETS COMPARED
    if !datasets_compared.is_empty() {
        prompt.push_str("## DATASETS COMPARED\n");
        prompt.push_str(&format!("  {}\n\n", datasets_compared.join(", ")));
    }

    // Section 4: Closing question
    prompt.push_str(
        "## WHAT IS THE BETTING ANGLE?\n\
         Give me the edge, the pace read, the key factors, and your lean.",
    );

    prompt
}

/// Format one team's metric line, e.g.
/// `  Duke: AdjOE=120.1 AdjDE=95.2 AdjTempo=68.5 AdjEM=24.9`
fn format_profile(profile: &TeamProfile) -> String {
    let metrics = profile
        .metrics
        .iter()
        .map(|(name, value)| match value {
            Some(v) => format!("{name}={v:.1}"),
            None => format!("{name}=n/a"),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("  {}: {}\n", profile.team, metrics)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

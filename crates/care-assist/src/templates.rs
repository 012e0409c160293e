//! Canned response bodies
//!
//! Every piece of scripted markdown lives here once. Bodies that mention the
//! spaces they were "found" in take those names as parameters.

use crate::types::KnowledgeSpace;

/// Join space names the way the response headers cite them: "A and B".
pub fn joined_names(spaces: &[&KnowledgeSpace]) -> String {
    spaces
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}

// ============================================================================
// Diabetes workflow
// ============================================================================

pub const LIMITED_PERSONAL_RESULTS: &str = r#"I searched your personal knowledge spaces and found limited information:

**From My Clinical Notes:**
- Basic diabetes patient observations
- Individual case notes without standardized protocols
- Personal clinical experiences and notes

**From Saved Research:**
- General diabetes research articles
- Individual study findings
- Academic papers on diabetes complications

**From Case Studies:**
- Patient cases mentioning diabetes management
- Individual treatment outcomes

However, I didn't find comprehensive, evidence-based clinical protocols or standardized treatment guidelines for diabetes management in your personal spaces."#;

pub const ORG_EXPANSION_SUGGESTION: &str =
    "However, I found relevant information in organization-wide knowledge spaces. Would you like me to expand the search to include:";

pub const ORG_RESOURCES_OVERVIEW: &str = "**Available organizational resources:**

🏥 **Emergency Medicine Protocols** (8 diabetes-related documents)
🏥 **Critical Care Guidelines** (12 diabetes management protocols)
💊 **Pharmacy Treatment Standards** (15 diabetes medication guidelines)";

pub const PERSONAL_RESULTS: &str = r#"I found some information in your personal knowledge spaces:

**From My Clinical Notes:**
- Patient case notes mentioning diabetes complications
- Blood glucose monitoring observations
- Personal treatment response notes

**From Saved Research:**
- Academic articles on diabetes pathophysiology
- Research papers on newer diabetes medications
- Studies on lifestyle interventions

However, these personal resources lack comprehensive clinical protocols and standardized treatment guidelines. For evidence-based management protocols, I recommend accessing organizational knowledge spaces."#;

const DIABETES_PROTOCOL_BODY: &str = r#"**Initial Assessment:**
- HbA1c >7% indicates need for intensified management
- Assess for diabetic complications (retinopathy, nephropathy, neuropathy)
- Review cardiovascular risk factors

**First-Line Treatment:**
- **Metformin** 500mg BID, titrate to 1000mg BID (max 2000mg/day)
- Target HbA1c <7% for most adults
- Monitor eGFR before initiation (contraindicated if <30 mL/min/1.73m²)

**Second-Line Options (if HbA1c remains >7% after 3 months):**
- **GLP-1 agonists**: Semaglutide 0.25mg weekly (cardiovascular benefits)
- **SGLT-2 inhibitors**: Empagliflozin 10mg daily (renal protection)
- **Insulin**: Basal insulin (Glargine) starting 10 units at bedtime

**Monitoring:**
- HbA1c every 3 months until target achieved, then every 6 months
- Annual comprehensive foot exam and eye screening
- Quarterly blood pressure and lipid monitoring

**Emergency Protocols:**
- **DKA**: pH <7.3, glucose >250mg/dL, ketones positive
- **Hypoglycemia**: <70mg/dL - 15g fast-acting carbs, recheck in 15 min"#;

/// The comprehensive Type 2 protocol, cited against the given spaces.
pub fn diabetes_protocol(org_spaces: &[&KnowledgeSpace]) -> String {
    format!(
        "**Type 2 Diabetes Management Protocol**\n*Based on {}*\n\n{}",
        joined_names(org_spaces),
        DIABETES_PROTOCOL_BODY
    )
}

pub const SELECT_ORG_PROMPT: &str = "Which organizational spaces would you like to include?";

pub const DECLINE_ORG: &str = "Understood. I'll continue searching only your personal knowledge spaces. You can always ask me to include organizational resources later.";

pub const SEARCH_ORG_SUGGESTION: &str =
    "Would you like me to search organizational knowledge spaces for comprehensive diabetes management protocols?";

// ============================================================================
// Multi-domain workflow
// ============================================================================

pub const CARDIOLOGY_GAP: &str = r#"I searched your active knowledge spaces and identified a gap:

**Found in your current spaces:**
- Diabetes-friendly meal plans and carbohydrate counting guidance
- General lifestyle assessment notes for this patient
- Adherence observations from previous care coordination visits

**Missing for this patient:**
- Sodium and fluid restrictions for heart failure
- Safe exercise thresholds for cardiac patients
- Interactions between cardiac and diabetes medications and diet

Your active spaces cover diabetes nutrition well, but they do not contain cardiology-specific lifestyle guidance."#;

pub const CARDIOLOGY_SUGGESTION: &str =
    "I found specialized cardiology resources that can close this gap. Would you like me to include them in the search?";

pub const CARDIOLOGY_RESOURCES: &str = "**Available specialized resources:**

❤️ **Cardiology Lifestyle Guidelines** (18 heart failure diet and activity documents)
🤝 **Cardiac Care Peer Network** (9 shared care plans for patients with heart failure and diabetes)";

const INTEGRATED_PLAN_BODY: &str = r#"**Nutrition (heart failure + diabetes):**
- Sodium under 2,000 mg/day; avoid processed and canned foods
- Fluid intake 1.5-2 L/day unless the cardiologist specifies otherwise
- Consistent carbohydrate portions (45-60 g per meal) to keep glucose stable
- Prefer the DASH pattern: vegetables, legumes, whole grains, lean protein

**Physical Activity:**
- Start with 10-15 minutes of low-intensity walking, 5 days a week
- Keep exertion at "can talk, cannot sing" (RPE 11-13)
- Check glucose before activity; delay exercise if below 100 mg/dL
- Stop and report chest pain, dizziness or unusual breathlessness

**Medication-Lifestyle Interactions:**
- **SGLT-2 inhibitors** benefit both conditions; watch hydration on hot days
- **Diuretics** can shift potassium; review salt substitutes before use
- **Beta-blockers** may mask hypoglycemia symptoms; reinforce glucose checks

**Monitoring & Coordination:**
- Daily weight; report a gain of more than 1 kg in a day or 2 kg in a week
- HbA1c every 3 months, BNP and renal panel as ordered by cardiology
- Share this plan with the cardiology and dietitian team at each visit"#;

/// Joint heart failure and diabetes lifestyle plan, cited against the given spaces.
pub fn integrated_care_plan(spaces: &[&KnowledgeSpace]) -> String {
    format!(
        "**Integrated Lifestyle Plan: Heart Failure with Type 2 Diabetes**\n*Based on {}*\n\n{}",
        joined_names(spaces),
        INTEGRATED_PLAN_BODY
    )
}

// ============================================================================
// Action replies
// ============================================================================

/// Status listing for the "show my active spaces" quick reply.
pub fn active_status(
    personal: &[&KnowledgeSpace],
    organization: &[&KnowledgeSpace],
    shared: &[&KnowledgeSpace],
    include_shared: bool,
) -> String {
    fn section(title: &str, spaces: &[&KnowledgeSpace]) -> String {
        let body = if spaces.is_empty() {
            "None currently active".to_string()
        } else {
            spaces
                .iter()
                .map(|s| format!("• {} ({} documents)", s.name, s.document_count))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!("**{} ({} active):**\n{}", title, spaces.len(), body)
    }

    let mut parts = vec![
        "**Active Knowledge Spaces:**".to_string(),
        section("Personal", personal),
        section("Organization", organization),
    ];
    if include_shared {
        parts.push(section("Shared", shared));
    }
    parts.join("\n\n")
}

/// Confirmation appended when a single space joins the search scope.
pub fn space_added(name: &str) -> String {
    format!("✓ Added {} to your search scope.", name)
}

pub const SAVED_TO_NOTES: &str = "✓ Saved the protocol to My Clinical Notes.";

pub const MEDICATION_GUIDE: &str = r#"**Diabetes Medication Quick Guide**

| Class | Example | Key caution |
|-------|---------|-------------|
| Biguanide | Metformin | Hold if eGFR <30 |
| GLP-1 agonist | Semaglutide | GI upset on titration |
| SGLT-2 inhibitor | Empagliflozin | Genital infections, volume depletion |
| Basal insulin | Glargine | Hypoglycemia |"#;

pub const PRINT_PROTOCOL: &str = "Quick reference card prepared. Send it to your printer from the protocol view.";

pub const PERSONAL_NOTES: &str = r#"**My Clinical Notes: diabetes entries**
- Case notes on three patients with poorly controlled HbA1c
- Observations on metformin GI tolerance
- Glucose log review reminders"#;

pub const CARE_PLAN_SAVED: &str = "✓ Saved the integrated care plan to Care Coordination Notes.";

pub const CARE_PLAN_SHARED: &str = "✓ Shared the integrated care plan with the Cardiac Care Peer Network.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpaceKind;

    #[test]
    fn test_protocol_cites_spaces() {
        let a = KnowledgeSpace::new("o1", "Emergency Medicine Protocols", SpaceKind::Organization, true, 156, "");
        let b = KnowledgeSpace::new("o3", "Pharmacy Treatment Standards", SpaceKind::Organization, true, 234, "");
        let text = diabetes_protocol(&[&a, &b]);
        assert!(text.starts_with("**Type 2 Diabetes Management Protocol**"));
        assert!(text.contains("*Based on Emergency Medicine Protocols and Pharmacy Treatment Standards*"));
        assert!(text.contains("Metformin"));
    }

    #[test]
    fn test_active_status_empty_org() {
        let p = KnowledgeSpace::new("p1", "My Clinical Notes", SpaceKind::Personal, true, 47, "");
        let text = active_status(&[&p], &[], &[], false);
        assert!(text.contains("**Personal (1 active):**\n• My Clinical Notes (47 documents)"));
        assert!(text.contains("**Organization (0 active):**\nNone currently active"));
        assert!(!text.contains("Shared"));
    }

    #[test]
    fn test_space_added_wording() {
        assert_eq!(
            space_added("Critical Care Guidelines"),
            "✓ Added Critical Care Guidelines to your search scope."
        );
    }
}

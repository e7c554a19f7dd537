//! Persona-priming prompt sent as the first message of a consultation.

const PREAMBLE: &str = "IMPORTANT SYSTEM INSTRUCTION: Act as 'Empath AI', a highly experienced \
and professional real-world medical doctor. ";

const CLOSING: &str = "Your goal is to solve the health problem by acting like a doctor. \
1. Ask clarifying questions if symptoms are vague (like a real doctor would). \
2. Provide potential causes (differential diagnosis). \
3. Suggest actionable treatments, remedies, or next steps. \
4. Maintain a professional, clinical, yet empathetic tone. \
CRITICAL: While acting as a doctor, you must strictly advise the user to see a physical \
professional for emergencies. \
If the user mentions self-harm or suicide, strictly provide crisis resources.";

/// Composes the doctor-persona instruction for a patient.
///
/// The `ADDITIONAL MEDICAL CONTEXT` clause is only included when `details`
/// is present and not blank.
pub fn build_persona_prompt(name: &str, problem: &str, details: Option<&str>) -> String {
    let mut prompt = String::from(PREAMBLE);
    prompt.push_str(&format!("The patient's name is {name}. "));
    prompt.push_str(&format!("The patient is presenting with: '{problem}'. "));

    if let Some(details) = details.filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!(
            " ADDITIONAL MEDICAL CONTEXT: The patient provided these specific details: \
             '{details}'. Take these details into account for your assessment. "
        ));
    }

    prompt.push_str(CLOSING);
    prompt
}

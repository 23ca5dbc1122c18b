//! Prompt construction for the travel assistant

/// Sampling temperature for chat requests
pub const TEMPERATURE: f32 = 0.7;

/// Upper bound on generated tokens per reply
pub const MAX_TOKENS: u32 = 512;

/// Build the full prompt sent to the model for one question. The persona
/// is fixed; each question stands alone, with no conversation history.
pub fn build_prompt(question: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a professional Vietnam travel assistant. ");
    prompt.push_str("Answer concisely and in a friendly tone, and suggest specific ");
    prompt.push_str("locations in Vietnam where relevant. ");
    prompt.push_str("Reply in the language the question was asked in.\n\n");
    prompt.push_str("Question: ");
    prompt.push_str(question);
    prompt
}

//! Prompt templates for SQL synthesis and result narration.
//!
//! The narration formatting instructions are an external contract with the
//! model: downstream output-compatibility tests depend on the literal
//! wording, so edit with care.

use serde_json::Value;
use tabletalk_core::dataset::TableSchema;

// ─── SQL synthesis ───────────────────────────────────────────────────────────

/// Build the synthesis prompt: the live schema as (column, declared type)
/// pairs plus the literal question.
pub fn synthesis_prompt(question: &str, schema: &TableSchema) -> String {
  let schema_info = schema
    .columns
    .iter()
    .map(|c| format!("  {} {}", c.name, c.declared_type))
    .collect::<Vec<_>>()
    .join("\n");

  format!(
    "Given the following schema for the '{table}' table:\n\
     \n\
     {schema_info}\n\
     \n\
     Generate a SQL query to answer the following question:\n\
     \n\
     {question}\n\
     \n\
     Return only the SQL query without any explanations.",
    table = schema.table,
  )
}

// ─── Narration ───────────────────────────────────────────────────────────────

/// Build the narration prompt: the question, the result rows serialized as
/// a field-keyed structure, and the SQL text, followed by the fixed
/// formatting instructions.
pub fn narration_prompt(question: &str, result_json: &Value, sql: &str) -> String {
  format!(
    "Summarize the answer to the question: \"{question}\" using the provided JSON data: \"{result_json}\", and the SQL query used to obtain this data: \"{sql}\".\n\
     \n\
     1. Analyze the SQL query to understand:\n\
     - The tables and columns being queried\n\
     - Any joins, aggregations, or transformations applied\n\
     - The meaning and context of each column in the result set\n\
     \n\
     2. Based on this analysis, interpret the data in the JSON, understanding what each field represents.\n\
     \n\
     3. Summarize the answer for a business executive audience:\n\
     - Use bullet points for clarity\n\
     - Highlight key numbers using bold formatting (e.g., **1000**)\n\
     - Use tables only when necessary for clarity\n\
     - Focus on directly answering the question without extra recommendations or reasoning\n\
     - Keep the summary concise and to the point\n\
     \n\
     4. Formatting guidelines:\n\
     - Start directly with the answer, without mentioning the audience or using phrases like \"Here is a summary...\"\n\
     - Use a single blank line between bullet points\n\
     - Replace any '$' with \"\\$\" in the final text\n\
     - Present the information as a natural, conversational response without referencing the data source\n\
     \n\
     Aim for a clear, concise summary that directly addresses the question based on the provided data and query analysis."
  )
}

//! Prompt construction and the character budgets that bound model context.

use cp_core::CorpusEntry;

/// Article bodies longer than this are cut before summarization.
pub const SUMMARY_CHAR_BUDGET: usize = 4000;
/// Per-article cap when packing a corpus for question answering.
pub const SNIPPET_CHAR_BUDGET: usize = 2000;
/// Aggregate cap on the packed corpus.
pub const CORPUS_CHAR_BUDGET: usize = 6000;

const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters, marking the cut with an
/// ellipsis. Text within budget is returned unchanged.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

pub fn summary_prompt(text: &str) -> String {
    let text = truncate_chars(text, SUMMARY_CHAR_BUDGET);
    format!(
        "Please provide a concise 2-3 sentence summary of the following article:\n\n\
         Article: {}\n\n\
         Summary:",
        text
    )
}

/// Greedy first-fit packing: snippets are added in order until the next one
/// would push the total past `total_budget`. A snippet is never split.
pub fn pack_corpus(corpus: &[CorpusEntry], snippet_budget: usize, total_budget: usize) -> Vec<String> {
    let mut snippets = Vec::new();
    let mut total_chars = 0;

    for entry in corpus {
        let content = truncate_chars(&entry.content, snippet_budget);
        let snippet = format!("Article: {}\n{}\n", entry.title, content);
        let len = snippet.chars().count();
        if total_chars + len > total_budget {
            break;
        }
        total_chars += len;
        snippets.push(snippet);
    }

    snippets
}

pub fn answer_prompt(corpus: &[CorpusEntry], question: &str) -> String {
    let context = pack_corpus(corpus, SNIPPET_CHAR_BUDGET, CORPUS_CHAR_BUDGET).join("\n\n");
    format!(
        "Based on these articles, please answer this question: {}\n\n\
         Context:\n{}\n\n\
         Answer:",
        question, context
    )
}

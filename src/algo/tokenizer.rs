use unicode_segmentation::UnicodeSegmentation;

/// Tokenize text into lowercase word tokens, filtering stopwords and short tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 2 && !is_stopword(w))
        .collect()
}

/// All word n-grams for every `n` in `min_n..=max_n`, shortest first.
///
/// Token runs shorter than `n` contribute no n-grams of that order.
pub fn word_ngrams(tokens: &[String], min_n: usize, max_n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in min_n.max(1)..=max_n {
        if tokens.len() < n {
            break;
        }
        out.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    out
}

/// Tokenize and expand into n-gram terms in one pass.
pub fn terms(text: &str, ngram_range: (usize, usize)) -> Vec<String> {
    let tokens = tokenize(text);
    word_ngrams(&tokens, ngram_range.0, ngram_range.1)
}

pub fn is_stopword(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "is" | "it" | "of" | "to" | "in" | "for" | "on" | "with"
        | "at" | "by" | "from" | "as" | "or" | "and" | "but" | "not" | "be" | "are"
        | "was" | "were" | "been" | "being" | "have" | "has" | "had" | "do" | "does"
        | "did" | "will" | "would" | "could" | "should" | "may" | "might" | "shall"
        | "can" | "this" | "that" | "these" | "those" | "there" | "here" | "where"
        | "when" | "what" | "which" | "who" | "whom" | "how" | "all" | "each" | "every"
        | "both" | "few" | "more" | "most" | "other" | "some" | "such" | "no" | "nor"
        | "only" | "own" | "same" | "so" | "than" | "too" | "very" | "just" | "because"
        | "about" | "into" | "through" | "during" | "before" | "after" | "above" | "below"
        | "between" | "under" | "again" | "further" | "then" | "once" | "any" | "its"
        | "your" | "our" | "their" | "his" | "her" | "my" | "if" | "up" | "out" | "also"
        | "am" | "me" | "we" | "us" | "he" | "him" | "she" | "they" | "them" | "you"
        | "yours" | "ours" | "theirs" | "hers" | "mine" | "itself" | "myself" | "yourself"
        | "himself" | "herself" | "themselves" | "ourselves" | "over" | "off" | "down"
        | "why" | "while" | "until" | "against" | "along" | "among" | "around" | "upon"
        | "within" | "without" | "via" | "per" | "yet" | "still" | "even" | "ever"
        | "never" | "much" | "many" | "must" | "get" | "got" | "however" | "whether"
        | "whose" | "whatever" | "across" | "onto" | "since" | "though" | "although"
    )
}

//! Porter stemmer, matching the variant bundled with lunr 2.x.
//!
//! The browser runs the same stemmer over queries, so any divergence here
//! makes indexed terms unreachable from the search box.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    mgr0: Regex,
    meq1: Regex,
    mgr1: Regex,
    s_v: Regex,
    step1a: Regex,
    step1a_plural: Regex,
    step1b_eed: Regex,
    step1b_ed_ing: Regex,
    step1b_restore_e: Regex,
    cvc: Regex,
    step1c: Regex,
    step2: Regex,
    step3: Regex,
    step4: Regex,
    step4_ion: Regex,
    step5: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let c = "[^aeiou]";
        let v = "[aeiouy]";
        let cs = format!("{c}[^aeiouy]*");
        let vs = format!("{v}[aeiou]*");

        let re = |pattern: &str| Regex::new(pattern).unwrap();

        Patterns {
            mgr0: re(&format!("^({cs})?{vs}{cs}")),
            meq1: re(&format!("^({cs})?{vs}{cs}({vs})?$")),
            mgr1: re(&format!("^({cs})?{vs}{cs}{vs}{cs}")),
            s_v: re(&format!("^({cs})?{v}")),
            step1a: re("^(.+?)(ss|i)es$"),
            step1a_plural: re("^(.+?)([^s])s$"),
            step1b_eed: re("^(.+?)eed$"),
            step1b_ed_ing: re("^(.+?)(ed|ing)$"),
            step1b_restore_e: re("(at|bl|iz)$"),
            cvc: re(&format!("^{cs}{v}[^aeiouwxy]$")),
            step1c: re("^(.+?[^aeiou])y$"),
            step2: re("^(.+?)(ational|tional|enci|anci|izer|bli|alli|entli|eli|ousli|ization|ation|ator|alism|iveness|fulness|ousness|aliti|iviti|biliti|logi)$"),
            step3: re("^(.+?)(icate|ative|alize|iciti|ical|ful|ness)$"),
            step4: re("^(.+?)(al|ance|ence|er|ic|able|ible|ant|ement|ment|ent|ou|ism|ate|iti|ous|ive|ize)$"),
            step4_ion: re("^(.+?)(s|t)(ion)$"),
            step5: re("^(.+?)e$"),
        }
    })
}

fn step2_suffix(suffix: &str) -> &'static str {
    match suffix {
        "ational" => "ate",
        "tional" => "tion",
        "enci" => "ence",
        "anci" => "ance",
        "izer" => "ize",
        "bli" => "ble",
        "alli" => "al",
        "entli" => "ent",
        "eli" => "e",
        "ousli" => "ous",
        "ization" => "ize",
        "ation" => "ate",
        "ator" => "ate",
        "alism" => "al",
        "iveness" => "ive",
        "fulness" => "ful",
        "ousness" => "ous",
        "aliti" => "al",
        "iviti" => "ive",
        "biliti" => "ble",
        "logi" => "log",
        _ => "",
    }
}

fn step3_suffix(suffix: &str) -> &'static str {
    match suffix {
        "icate" => "ic",
        "alize" => "al",
        "iciti" => "ic",
        "ical" => "ic",
        _ => "",
    }
}

/// Capture groups joined together, if the pattern matches
fn joined(re: &Regex, word: &str, groups: &[usize]) -> Option<String> {
    let caps = re.captures(word)?;
    Some(
        groups
            .iter()
            .filter_map(|&i| caps.get(i).map(|m| m.as_str()))
            .collect(),
    )
}

/// Stem and suffix of a word matching `^(stem)(suffix)$`
fn split_suffix(re: &Regex, word: &str) -> Option<(String, String)> {
    let caps = re.captures(word)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// `([^aeiouylsz])\1$`, which the regex crate cannot express directly
fn ends_with_double_consonant(word: &str) -> bool {
    let mut tail = word.chars().rev();
    match (tail.next(), tail.next()) {
        (Some(last), Some(prev)) => last == prev && !"aeiouylsz".contains(last),
        _ => false,
    }
}

/// Reduce an English word to its stem.
pub fn stem(word: &str) -> String {
    if word.encode_utf16().count() < 3 {
        return word.to_string();
    }

    let p = patterns();
    let initial_y = word.starts_with('y');
    let mut w = if initial_y {
        format!("Y{}", &word[1..])
    } else {
        word.to_string()
    };

    // Step 1a: plurals
    if let Some(next) =
        joined(&p.step1a, &w, &[1, 2]).or_else(|| joined(&p.step1a_plural, &w, &[1, 2]))
    {
        w = next;
    }

    // Step 1b: -eed, -ed, -ing
    if let Some(stem) = joined(&p.step1b_eed, &w, &[1]) {
        if p.mgr0.is_match(&stem) {
            w.pop();
        }
    } else if let Some(stem) = joined(&p.step1b_ed_ing, &w, &[1]) {
        if p.s_v.is_match(&stem) {
            w = stem;
            if p.step1b_restore_e.is_match(&w) {
                w.push('e');
            } else if ends_with_double_consonant(&w) {
                w.pop();
            } else if p.cvc.is_match(&w) {
                w.push('e');
            }
        }
    }

    // Step 1c: terminal y after a consonant
    if let Some(stem) = joined(&p.step1c, &w, &[1]) {
        w = stem + "i";
    }

    // Step 2
    if let Some((stem, suffix)) = split_suffix(&p.step2, &w) {
        if p.mgr0.is_match(&stem) {
            w = stem + step2_suffix(&suffix);
        }
    }

    // Step 3
    if let Some((stem, suffix)) = split_suffix(&p.step3, &w) {
        if p.mgr0.is_match(&stem) {
            w = stem + step3_suffix(&suffix);
        }
    }

    // Step 4
    if let Some(stem) = joined(&p.step4, &w, &[1]) {
        if p.mgr1.is_match(&stem) {
            w = stem;
        }
    } else if let Some(stem) = joined(&p.step4_ion, &w, &[1, 2]) {
        if p.mgr1.is_match(&stem) {
            w = stem;
        }
    }

    // Step 5
    if let Some(stem) = joined(&p.step5, &w, &[1]) {
        if p.mgr1.is_match(&stem) || (p.meq1.is_match(&stem) && !p.cvc.is_match(&stem)) {
            w = stem;
        }
    }
    if w.ends_with("ll") && p.mgr1.is_match(&w) {
        w.pop();
    }

    if initial_y {
        w.replace_range(..1, "y");
    }

    w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pairs: &[(&str, &str)]) {
        for (word, expected) in pairs {
            assert_eq!(stem(word), *expected, "stemming {:?}", word);
        }
    }

    #[test]
    fn test_short_words_untouched() {
        check(&[("a", "a"), ("is", "is"), ("", "")]);
    }

    #[test]
    fn test_step1() {
        check(&[
            ("caresses", "caress"),
            ("ponies", "poni"),
            ("ties", "ti"),
            ("caress", "caress"),
            ("cats", "cat"),
            ("feed", "feed"),
            ("agreed", "agre"),
            ("plastered", "plaster"),
            ("bled", "bled"),
            ("motoring", "motor"),
            ("sing", "sing"),
            ("conflated", "conflat"),
            ("troubled", "troubl"),
            ("sized", "size"),
            ("hopping", "hop"),
            ("tanned", "tan"),
            ("falling", "fall"),
            ("hissing", "hiss"),
            ("fizzed", "fizz"),
            ("failing", "fail"),
            ("filing", "file"),
            ("happy", "happi"),
            ("sky", "ski"),
        ]);
    }

    #[test]
    fn test_steps_2_to_5() {
        check(&[
            ("relational", "relat"),
            ("conditional", "condit"),
            ("rational", "ration"),
            ("valenci", "valenc"),
            ("digitizer", "digit"),
            ("hopefulness", "hope"),
            ("goodness", "good"),
            ("triplicate", "triplic"),
            ("formative", "form"),
            ("electrical", "electr"),
            ("adjustment", "adjust"),
            ("adoption", "adopt"),
            ("controll", "control"),
            ("roll", "roll"),
            ("generalizations", "gener"),
            ("oscillators", "oscil"),
        ]);
    }

    #[test]
    fn test_initial_y() {
        check(&[("yelling", "yell"), ("youth", "youth"), ("yesterday", "yesterday")]);
    }

    #[test]
    fn test_everyday_words() {
        check(&[
            ("running", "run"),
            ("connection", "connect"),
            ("searching", "search"),
            ("notes", "note"),
            ("omitted", "omit"),
            ("wiki", "wiki"),
        ]);
    }

    #[test]
    fn test_double_consonant_helper() {
        assert!(ends_with_double_consonant("hopp"));
        assert!(!ends_with_double_consonant("fall"));
        assert!(!ends_with_double_consonant("hiss"));
        assert!(!ends_with_double_consonant("a"));
    }
}

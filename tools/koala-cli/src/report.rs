use std::fmt::Write;

use koala_model::{Sentence, Tree};

fn words_line(label: &str, words: &[std::rc::Rc<koala_model::Word>]) -> String {
    let surfaces: Vec<&str> = words.iter().map(|w| w.surface()).collect();
    format!("  {:<10}{}\n", label, surfaces.join(", "))
}

/// Human-readable dump of one sentence and every layer it carries.
pub fn render_sentence(index: usize, sentence: &Sentence) -> String {
    let mut out = String::new();

    // 1. Words
    let _ = writeln!(out, "#{} {}", index + 1, sentence.surface_string(" "));
    let _ = writeln!(out, "  {:<10}{}", "tagged", sentence.single_line_string());
    out.push_str(&words_line("nouns", &sentence.nouns()));
    out.push_str(&words_line("verbs", &sentence.verbs()));
    out.push_str(&words_line("modifiers", &sentence.modifiers()));

    // 2. Phrase structure
    if let Some(tree) = sentence.syntax_tree() {
        out.push_str("  tree\n");
        for line in tree.tree_string().lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }

    // 3. Edges and entities
    for edge in sentence.dependencies().iter() {
        let _ = writeln!(out, "  dep       {}", edge);
    }
    for edge in sentence.roles().iter() {
        let _ = writeln!(out, "  role      {}", edge);
    }
    for entity in sentence.entities().iter() {
        let _ = writeln!(out, "  entity    {}", entity);
    }
    for group in sentence.coref_groups().iter() {
        let _ = writeln!(out, "  coref     {}", group);
    }

    out
}

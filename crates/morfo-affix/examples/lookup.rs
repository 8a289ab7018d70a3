use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use morfo_affix::{SuffixAnalyzer, accents};
use morfo_lexicon::{LoadMode, Lexicon};
use morfo_types::Word;

const USAGE: &str = "usage: cargo run -p morfo-affix --example lookup -- <lexicon> <rules> <lang> [--demo | <word>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let lexicon_path = args.next().map(PathBuf::from).context(USAGE)?;
    let rules_path = args.next().map(PathBuf::from).context(USAGE)?;
    let lang = args.next().context(USAGE)?;
    let next = args.next();
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let words: Vec<String> = match next.as_deref() {
        Some("--demo") => vec![
            "dámelo".into(),
            "comprándolo".into(),
            "casas".into(),
            "cantaba".into(),
            "rehacer".into(),
        ],
        Some(word) => vec![word.to_string()],
        None => bail!(USAGE),
    };

    let lexicon = Lexicon::load_with_mode(&lexicon_path, LoadMode::Mmap)
        .with_context(|| format!("loading lexicon from {}", lexicon_path.display()))?;
    let analyzer = SuffixAnalyzer::from_file(&rules_path, accents::for_language(&lang))
        .with_context(|| format!("loading affix rules from {}", rules_path.display()))?;

    println!("Lexicon: {} ({} forms)", lexicon_path.display(), lexicon.form_count());

    for form in words {
        let mut word = Word::new(form.as_str());
        analyzer.annotate(&mut word, &lexicon);
        let origin = if word.is_found_in_dict() { "dictionary" } else { "affixes" };
        println!("\nSurface: {} [{}]", form, origin);
        if word.n_analyses() == 0 {
            println!("  (no analysis)");
        }
        for analysis in word.analyses() {
            println!("  {}", analysis);
            for part in &analysis.retokenization {
                let tags: Vec<&str> = part.analyses().iter().map(|a| a.tag.as_str()).collect();
                println!("    {:<10} {}", part.form(), tags.join(" "));
            }
        }
    }

    Ok(())
}

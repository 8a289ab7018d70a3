use std::path::PathBuf;

use morfo_lexicon::{LoadMode, Lexicon};
use morfo_types::Dictionary;

const FIXTURE: &str = "\
# Spanish fixture
canto canto NCMS000 cantar VMIP1S0
dar dar VMN0000
lo lo PP3MSA00 el DA0NS0
comido comer VMP00SM
";

fn write_fixture(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("dicc.src");
    std::fs::write(&path, FIXTURE).expect("write fixture");
    path
}

#[test]
fn loads_with_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);
    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let lex = Lexicon::load_with_mode(&path, mode).expect("load lexicon");
        assert_eq!(lex.form_count(), 4);
        assert_eq!(lex.analysis_count(), 6);
        let canto = lex.search_form("Canto");
        assert_eq!(canto.len(), 2);
        assert_eq!(canto[1].lemma, "cantar");
        assert_eq!(canto[1].tag, "VMIP1S0");
        assert!(canto.iter().all(|a| !a.is_retokenizable()));
    }
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.src");
    let err = Lexicon::load(&path).err().expect("missing file");
    assert!(format!("{err:#}").contains("absent.src"));
}

#[test]
fn misses_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    let lex = Lexicon::load(write_fixture(&dir)).unwrap();
    assert!(lex.search_form("dame").is_empty());
    assert!(!lex.contains("dame"));
}

/*!
 * Tests for the editing session: persistence, rebuild and display helpers
 */

use anyhow::Result;

use subbank::app_config::Config;
use subbank::editor::LineDraft;
use subbank::errors::{EditError, StoreError};
use subbank::model::{GameText, SubtitleLine};
use subbank::repl::{MockReplClient, BUMP_TEXT_VERSION_FORM, MAKE_TEXT_FORM};
use subbank::session::{EditorSession, RebuildOutcome};

use crate::common::{self, MemoryBankStore};

fn session_with(store: MemoryBankStore, repl: MockReplClient, config: Config) -> Result<EditorSession> {
    common::init_logging();
    let mut session = EditorSession::new(config, Box::new(store), Box::new(repl));
    session.load()?;
    Ok(session)
}

fn two_banks() -> Vec<subbank::LanguageBank> {
    vec![
        common::sample_bank(0, "english.json"),
        common::sample_bank(1, "french.json"),
    ]
}

#[test]
fn test_load_shouldApplyConfiguredLanguages() -> Result<()> {
    let mut config = Config::default();
    config.editor.current_language = 1;
    config.editor.base_language = 0;
    let session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), config)?;

    assert!(session.is_loaded());
    assert_eq!(session.model().selection().current_bank(), 1);
    assert_eq!(session.model().selection().base_bank(), 0);
    Ok(())
}

#[test]
fn test_load_withUnknownLanguage_shouldFallBackToFirstBank() -> Result<()> {
    let mut config = Config::default();
    config.editor.current_language = 9;
    let session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), config)?;

    assert_eq!(session.model().selection().current_bank(), 0);
    Ok(())
}

#[test]
fn test_load_withStoreFailure_shouldNotMarkLoaded() {
    struct MissingStore;
    impl subbank::store::BankStore for MissingStore {
        fn load(&self) -> Result<Vec<subbank::LanguageBank>, StoreError> {
            Err(StoreError::MissingProject("nowhere".to_string()))
        }
        fn save(&self, _banks: &[subbank::LanguageBank]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    let mut session = EditorSession::new(Config::default(), Box::new(MissingStore), Box::new(MockReplClient::working()));
    assert!(matches!(session.load(), Err(StoreError::MissingProject(_))));
    assert!(!session.is_loaded());
}

#[tokio::test]
async fn test_save_withConnectedRepl_shouldRequestRebuild() -> Result<()> {
    let store = MemoryBankStore::with_banks(two_banks());
    let repl = MockReplClient::connected();
    let mut session = session_with(store.clone(), repl.clone(), Config::default())?;

    session.model_mut().delete_scene(0, "outro")?;
    let status = session.save().await;

    assert!(status.saved);
    assert_eq!(status.message(), "Saved!");
    assert_eq!(status.rebuild, RebuildOutcome::Requested);
    assert_eq!(repl.received(), vec![MAKE_TEXT_FORM, BUMP_TEXT_VERSION_FORM]);
    assert!(!store.saved()[0].has_scene("outro"));
    assert_eq!(session.last_save(), Some(&status));
    Ok(())
}

#[tokio::test]
async fn test_save_withDisconnectedRepl_shouldSkipRebuild() -> Result<()> {
    let store = MemoryBankStore::with_banks(two_banks());
    let repl = MockReplClient::working();
    let mut session = session_with(store.clone(), repl.clone(), Config::default())?;

    let status = session.save().await;

    assert!(status.saved);
    assert_eq!(status.rebuild, RebuildOutcome::Skipped);
    assert!(repl.received().is_empty());
    assert_eq!(store.saves(), 1);
    Ok(())
}

#[tokio::test]
async fn test_save_withAutoRebuildOff_shouldSkipRebuild() -> Result<()> {
    let mut config = Config::default();
    config.repl.auto_rebuild = false;
    let repl = MockReplClient::connected();
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), repl.clone(), config)?;

    let status = session.save().await;

    assert_eq!(status.rebuild, RebuildOutcome::Skipped);
    assert!(repl.received().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_save_withDroppedRepl_shouldReportRebuildFailure() -> Result<()> {
    let repl = MockReplClient::dropping_after(1);
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), repl.clone(), Config::default())?;

    let status = session.save().await;

    assert!(status.saved);
    assert!(matches!(status.rebuild, RebuildOutcome::Failed(_)));
    assert_eq!(repl.received(), vec![MAKE_TEXT_FORM]);
    assert!(!session.repl_connected());
    Ok(())
}

#[tokio::test]
async fn test_save_withFailingStore_shouldKeepEditsAndSkipRebuild() -> Result<()> {
    let store = MemoryBankStore::failing(two_banks());
    let repl = MockReplClient::connected();
    let mut session = session_with(store.clone(), repl.clone(), Config::default())?;

    session.model_mut().delete_scene(0, "outro")?;
    let status = session.save().await;

    assert!(!status.saved);
    assert_eq!(status.message(), "Error!");
    assert_eq!(status.rebuild, RebuildOutcome::Skipped);
    assert!(repl.received().is_empty());
    assert!(!session.model().scene_exists(0, "outro"));
    assert!(store.saved()[0].has_scene("outro"));
    Ok(())
}

#[tokio::test]
async fn test_rebuild_shouldConnectFirst() -> Result<()> {
    let repl = MockReplClient::working();
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), repl.clone(), Config::default())?;

    assert!(!session.repl_connected());
    session.rebuild().await?;

    assert!(session.repl_connected());
    assert_eq!(repl.received().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_rebuild_withUnreachableRepl_shouldFail() -> Result<()> {
    let mut session = session_with(
        MemoryBankStore::with_banks(two_banks()),
        MockReplClient::unreachable(),
        Config::default(),
    )?;

    assert!(session.rebuild().await.is_err());
    Ok(())
}

#[test]
fn test_addSceneNamed_shouldCreateAndSelectScene() -> Result<()> {
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;

    session.add_scene_named("credits")?;

    assert!(session.model().scene_exists(0, "credits"));
    let (selected, scene) = session.model().current_scene().unwrap();
    assert_eq!(selected.name, "credits");
    assert!(scene.is_empty());
    Ok(())
}

#[test]
fn test_addSceneNamed_withSelectionDisabled_shouldKeepSelection() -> Result<()> {
    let mut config = Config::default();
    config.editor.add_new_scene_as_current = false;
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), config)?;

    session.add_scene_named("credits")?;

    assert!(session.model().scene_exists(0, "credits"));
    assert!(session.model().current_scene().is_none());
    Ok(())
}

#[test]
fn test_addSceneNamed_withEmptyOrDuplicateName_shouldFail() -> Result<()> {
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;

    assert_eq!(session.add_scene_named(""), Err(EditError::EmptySceneName));
    assert!(matches!(
        session.add_scene_named("intro"),
        Err(EditError::DuplicateScene { .. })
    ));
    Ok(())
}

#[test]
fn test_submitNewLine_withoutSelection_shouldFail() -> Result<()> {
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;
    session.model_mut().line_draft_mut().text = "hello".to_string();

    assert_eq!(session.submit_new_line(), Err(EditError::NoSceneSelected));
    Ok(())
}

#[test]
fn test_submitNewLine_shouldInsertTrimmedTextSorted() -> Result<()> {
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;
    session.model_mut().select_scene(0, "intro")?;
    {
        let draft = session.model_mut().line_draft_mut();
        draft.start = 15.0;
        draft.end = 18.0;
        draft.text = "in between   ".to_string();
        draft.speaker = "jak".to_string();
    }

    let index = session.submit_new_line()?;

    assert_eq!(index, 2);
    let inserted = &session.model().scene(0, "intro").unwrap().lines()[2];
    assert_eq!(inserted.text.as_str(), "in between");
    assert_eq!(inserted.speaker, "jak");
    Ok(())
}

#[test]
fn test_editLine_shouldEncodeDraftAndResort() -> Result<()> {
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;
    let original = session.model().scene(0, "intro").unwrap().lines()[0].clone();

    let mut draft = session.line_draft(&original);
    assert_eq!(draft.text, "first");
    draft.start = 40.0;
    draft.end = 45.0;
    draft.text = "moved".to_string();
    session.edit_line(0, "intro", 0, &draft)?;

    let lines = session.model().scene(0, "intro").unwrap().lines();
    assert_eq!(lines.last().unwrap().text.as_str(), "moved");
    assert_eq!(lines[0].text.as_str(), "second");
    Ok(())
}

#[test]
fn test_editLine_withBadIndex_shouldFailNotFound() -> Result<()> {
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;
    let result = session.edit_line(0, "outro", 5, &LineDraft::default());
    assert!(matches!(result, Err(EditError::NotFound(_))));
    Ok(())
}

#[test]
fn test_setSpeakerDisplay_shouldUpdateCurrentBank() -> Result<()> {
    let mut session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;

    session.set_speaker_display("daxter", "Daxter")?;
    assert_eq!(session.speaker_display(0, "daxter").as_deref(), Some("Daxter"));
    assert!(session.speaker_display(1, "daxter").is_none());

    session.set_speaker_display("daxter", "")?;
    assert!(session.speaker_display(0, "daxter").is_none());
    Ok(())
}

#[test]
fn test_speakerLabel_withUnknownSpeaker_shouldShowPlaceholder() -> Result<()> {
    let session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;
    let known = SubtitleLine::new(0.0, 1.0, GameText::from("hi"), "jak", false);
    let unknown = SubtitleLine::new(0.0, 1.0, GameText::from("hi"), "keira", false);

    assert_eq!(session.speaker_label(0, &known), "Jak");
    assert_eq!(session.speaker_label(0, &unknown), "N/A");
    Ok(())
}

#[test]
fn test_lineSummary_shouldPrefixSpeakerAndTruncate() -> Result<()> {
    let session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), Config::default())?;
    let short = SubtitleLine::new(0.0, 10.0, GameText::from("Hey"), "jak", false);
    let long = SubtitleLine::new(
        5.0,
        12.5,
        GameText::from("This line is far too long to show in one row"),
        "",
        false,
    );

    assert_eq!(session.line_summary(0, &short), "[0 - 10] Jak: Hey");
    assert_eq!(
        session.line_summary(0, &long),
        "[5 - 12.5] This line is far too long to show i..."
    );
    Ok(())
}

#[test]
fn test_roster_shouldComeFromConfig() -> Result<()> {
    let mut config = Config::default();
    config.editor.speakers = vec!["jak".to_string(), "daxter".to_string()];
    let session = session_with(MemoryBankStore::with_banks(two_banks()), MockReplClient::working(), config)?;

    assert_eq!(session.roster().index_by_name("daxter"), 2);
    let bank = session.model().bank(0).unwrap();
    assert_eq!(session.roster().unassigned(bank).collect::<Vec<_>>(), vec!["daxter"]);
    Ok(())
}

#[test]
fn test_saveStatus_summary_shouldDescribeRebuildWithoutConsumingStatus() {
    use subbank::session::SaveStatus;

    let failed = SaveStatus { saved: true, rebuild: RebuildOutcome::Failed("broken pipe".to_string()) };
    let requested = SaveStatus { saved: true, rebuild: RebuildOutcome::Requested };
    let not_saved = SaveStatus { saved: false, rebuild: RebuildOutcome::Skipped };

    assert_eq!(failed.summary(), "Saved! Rebuild failed: broken pipe");
    assert_eq!(requested.summary(), "Saved! Game text rebuild requested");
    assert_eq!(not_saved.summary(), "Error!");
    assert!(matches!(&failed.rebuild, RebuildOutcome::Failed(reason) if reason == "broken pipe"));
}

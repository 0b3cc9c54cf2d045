/*!
 * Speaker roster lookups.
 *
 * The roster is the externally managed list of speaker ids, in the order the
 * game knows them. Index 0 of the game's own table is a reserved "no
 * speaker" slot, so `index_by_name` is 1-based and returns 0 for unknown ids.
 */

use crate::model::LanguageBank;

/// Index meaning "no speaker"
pub const NO_SPEAKER: usize = 0;

/// Ordered list of known speaker ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerRoster {
    ids: Vec<String>,
}

impl SpeakerRoster {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Speaker id at a 0-based roster position
    pub fn name_by_index(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// 1-based game index of a speaker id, `NO_SPEAKER` if unknown
    pub fn index_by_name(&self, id: &str) -> usize {
        self.ids
            .iter()
            .position(|known| known == id)
            .map_or(NO_SPEAKER, |i| i + 1)
    }

    /// Roster ids that have a display name in the bank, in roster order
    pub fn assigned<'a>(&'a self, bank: &'a LanguageBank) -> impl Iterator<Item = &'a str> + 'a {
        self.ids
            .iter()
            .filter(move |id| bank.speakers.contains_key(id.as_str()))
            .map(String::as_str)
    }

    /// Roster ids the bank has no display name for yet
    pub fn unassigned<'a>(&'a self, bank: &'a LanguageBank) -> impl Iterator<Item = &'a str> + 'a {
        self.ids
            .iter()
            .filter(move |id| !bank.speakers.contains_key(id.as_str()))
            .map(String::as_str)
    }
}

//! Per-chat flat-file persistence.
//!
//! - categories: `<categories_dir>/<chat_id>.json`, a JSON array of names
//! - expenses: `<expenses_dir>/<chat_id>.csv`, header row + one row per expense

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use crate::{
    categories::finalize_categories, config::Config, domain::ChatId, expense::ExpenseRecord,
    Result,
};

#[derive(Clone, Debug)]
pub struct Storage {
    categories_dir: PathBuf,
    expenses_dir: PathBuf,
}

impl Storage {
    pub fn new(cfg: &Config) -> Self {
        Self {
            categories_dir: cfg.categories_dir.clone(),
            expenses_dir: cfg.expenses_dir.clone(),
        }
    }

    pub fn categories_path(&self, chat_id: ChatId) -> PathBuf {
        self.categories_dir.join(format!("{}.json", chat_id.0))
    }

    pub fn expenses_path(&self, chat_id: ChatId) -> PathBuf {
        self.expenses_dir.join(format!("{}.csv", chat_id.0))
    }

    /// The chat's category set, or `None` if it was never set.
    pub fn load_categories(&self, chat_id: ChatId) -> Result<Option<Vec<String>>> {
        let path = self.categories_path(chat_id);
        if !path.exists() {
            return Ok(None);
        }
        let txt = fs::read_to_string(&path)?;
        let names: Vec<String> = serde_json::from_str(&txt)?;
        Ok(Some(names))
    }

    /// Normalize `names`, append "Other" and replace the chat's category file.
    ///
    /// The file is written to a sibling temp file first and renamed into place,
    /// so readers never observe a half-written list. Returns the stored list.
    pub fn save_categories(&self, chat_id: ChatId, names: &[String]) -> Result<Vec<String>> {
        let stored = finalize_categories(names.iter().cloned());
        let path = self.categories_path(chat_id);
        let tmp = path.with_extension("json.tmp");

        let txt = serde_json::to_string_pretty(&stored)?;
        fs::write(&tmp, txt)?;
        fs::rename(&tmp, &path)?;

        tracing::info!(chat_id = chat_id.0, count = stored.len(), "saved categories");
        Ok(stored)
    }

    /// Append one row to the chat's expense file, writing the header first if
    /// the file is new.
    pub fn append_expense(&self, chat_id: ChatId, record: &ExpenseRecord) -> Result<()> {
        let path = self.expenses_path(chat_id);
        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        tracing::info!(
            chat_id = chat_id.0,
            category = %record.category,
            price = record.price,
            "appended expense"
        );
        Ok(())
    }

    /// Every expense recorded for the chat, oldest first. Missing file = none.
    pub fn load_expenses(&self, chat_id: ChatId) -> Result<Vec<ExpenseRecord>> {
        let path = self.expenses_path(chat_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let mut out = Vec::new();
        for row in reader.deserialize::<ExpenseRecord>() {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn append_raw(path: &std::path::Path, bytes: &[u8]) {
        let mut f = OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(bytes).unwrap();
    }

    fn storage() -> (tempfile::TempDir, Storage) {
        let root = tempfile::tempdir().unwrap();
        let cfg = Config::with_data_dir("1:x".to_string(), root.path().to_path_buf()).unwrap();
        (root, Storage::new(&cfg))
    }

    fn record(category: &str, price: f64, comment: &str) -> ExpenseRecord {
        ExpenseRecord {
            date: "2026-10-18 12:00:00".to_string(),
            user: "Ann Lee".to_string(),
            category: category.to_string(),
            price,
            comment: comment.to_string(),
        }
    }

    #[test]
    fn categories_absent_until_saved() {
        let (_root, st) = storage();
        assert_eq!(st.load_categories(ChatId(-100)).unwrap(), None);
        assert!(!st.categories_path(ChatId(-100)).exists());
    }

    #[test]
    fn save_categories_normalizes_and_overwrites() {
        let (_root, st) = storage();
        let chat = ChatId(-100);

        let names = vec!["Food".to_string(), " Food".to_string(), "Rent ".to_string()];
        let stored = st.save_categories(chat, &names).unwrap();
        assert_eq!(stored, vec!["Food", "Rent", "Other"]);
        assert_eq!(st.load_categories(chat).unwrap(), Some(stored));

        let stored = st.save_categories(chat, &["Kids".to_string()]).unwrap();
        assert_eq!(stored, vec!["Kids", "Other"]);
        assert_eq!(st.load_categories(chat).unwrap(), Some(stored));
        assert!(!st.categories_path(chat).with_extension("json.tmp").exists());
    }

    #[test]
    fn chats_are_isolated() {
        let (_root, st) = storage();
        st.save_categories(ChatId(1), &["Food".to_string()]).unwrap();
        assert_eq!(st.load_categories(ChatId(2)).unwrap(), None);
    }

    #[test]
    fn append_expense_writes_header_once() {
        let (_root, st) = storage();
        let chat = ChatId(-42);

        st.append_expense(chat, &record("Food", 12.5, "lunch")).unwrap();
        st.append_expense(chat, &record("Rent", 900.0, "")).unwrap();

        let txt = fs::read_to_string(st.expenses_path(chat)).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Date,User,Category,Price,Comment");
        assert_eq!(lines[1], "2026-10-18 12:00:00,Ann Lee,Food,12.5,lunch");
        assert!(lines[2].starts_with("2026-10-18 12:00:00,Ann Lee,Rent,900"));
        assert!(lines[2].ends_with(','));
    }

    #[test]
    fn expenses_round_trip_with_quoting() {
        let (_root, st) = storage();
        let chat = ChatId(5);
        let tricky = record("Food, drinks", 3.25, "said \"hi\"\nthen left");
        st.append_expense(chat, &tricky).unwrap();
        st.append_expense(chat, &record("Rent", 1.0, "")).unwrap();

        let rows = st.load_expenses(chat).unwrap();
        assert_eq!(rows, vec![tricky, record("Rent", 1.0, "")]);
    }

    #[test]
    fn load_expenses_missing_file_is_empty() {
        let (_root, st) = storage();
        assert!(st.load_expenses(ChatId(9)).unwrap().is_empty());
    }

    #[test]
    fn load_expenses_reports_corrupt_rows() {
        let (_root, st) = storage();
        let chat = ChatId(6);
        st.append_expense(chat, &record("Food", 1.0, "")).unwrap();
        append_raw(&st.expenses_path(chat), b"2026-10-18 13:00:00,Ann,Food,abc,\n");
        assert!(matches!(st.load_expenses(chat), Err(crate::Error::Csv(_))));
    }
}

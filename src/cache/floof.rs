use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use parking_lot::RwLock;

/// A cached Floof Majesty score and the algorithm version that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloofScoreEntry {
    pub score: f64,
    pub version: u32,
}

// URL -> score, mirrored to a flat file on every change
pub struct FloofMajestyStore {
    file: PathBuf,
    scores: RwLock<HashMap<String, FloofScoreEntry>>,
}

impl FloofMajestyStore {
    /// Opens the store at `file`, creating it (and its directory) when missing.
    pub fn new(file: impl Into<PathBuf>) -> io::Result<Self> {
        let file = file.into();
        ensure_dir(&file)?;

        let scores = match fs::read_to_string(&file) {
            Ok(contents) => parse_scores(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::write(&file, "")?;
                HashMap::new()
            }
            Err(e) => return Err(e),
        };

        log::info!("Loaded {} Floof Majesty scores from {}", scores.len(), file.display());

        Ok(Self {
            file,
            scores: RwLock::new(scores),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn get(&self, image_url: &str) -> Option<FloofScoreEntry> {
        let scores = self.scores.read();
        scores.get(image_url).copied()
    }

    /// Records a score and rewrites the backing file.
    ///
    /// Nothing is written when the URL already holds exactly this score,
    /// whatever version it was stored under.
    pub fn set(&self, image_url: &str, score: f64, version: u32) -> io::Result<()> {
        let mut scores = self.scores.write();

        if let Some(existing) = scores.get(image_url) {
            if existing.score == score {
                return Ok(());
            }
        }

        let previous = scores.insert(image_url.to_string(), FloofScoreEntry { score, version });
        if let Err(e) = self.save_locked(&scores) {
            // Keep memory in line with what is on disk
            match previous {
                Some(entry) => scores.insert(image_url.to_string(), entry),
                None => scores.remove(image_url),
            };
            return Err(e);
        }

        Ok(())
    }

    /// Highest scoring URL, the current favourite.
    pub fn top_score(&self) -> Option<(String, FloofScoreEntry)> {
        let scores = self.scores.read();
        scores
            .iter()
            .max_by(|(_, a), (_, b)| a.score.total_cmp(&b.score))
            .map(|(url, entry)| (url.clone(), *entry))
    }

    pub fn len(&self) -> usize {
        self.scores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save_locked(&self, scores: &HashMap<String, FloofScoreEntry>) -> io::Result<()> {
        ensure_dir(&self.file)?;

        let mut keys: Vec<&String> = scores.keys().collect();
        keys.sort();

        let mut contents = String::new();
        for key in keys {
            let entry = &scores[key];
            contents.push_str(&format!("{},{:.6},{}\n", quote_url(key), entry.score, entry.version));
        }

        // Write beside the real file, then swap it in
        let mut tmp = self.file.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.file)
    }
}

fn ensure_dir(file: &Path) -> io::Result<()> {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

fn quote_url(url: &str) -> String {
    if url.contains(',') || url.contains('"') {
        format!("\"{}\"", url.replace('"', "\"\""))
    } else {
        url.to_string()
    }
}

fn parse_scores(contents: &str) -> HashMap<String, FloofScoreEntry> {
    contents.lines().filter_map(parse_line).collect()
}

// `url,score[,version]`; anything else is skipped
fn parse_line(line: &str) -> Option<(String, FloofScoreEntry)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (url, rest) = if let Some(quoted) = line.strip_prefix('"') {
        let end = find_closing_quote(quoted)?;
        let url = quoted[..end].replace("\"\"", "\"");
        (url, quoted[end + 1..].strip_prefix(',')?)
    } else {
        let (url, rest) = line.split_once(',')?;
        (url.trim().to_string(), rest)
    };

    if url.is_empty() {
        return None;
    }

    let mut fields = rest.split(',').map(str::trim);
    let score = fields.next()?.parse::<f64>().ok()?;
    if !score.is_finite() {
        return None;
    }
    let version = match fields.next() {
        Some(raw) => raw.parse::<u32>().ok()?,
        None => 0,
    };

    Some((url, FloofScoreEntry { score, version }))
}

fn find_closing_quote(quoted: &str) -> Option<usize> {
    let bytes = quoted.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FloofMajestyStore {
        FloofMajestyStore::new(dir.path().join("floof_scores.csv")).unwrap()
    }

    #[test]
    fn new_creates_missing_file_and_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("scores.csv");

        let store = FloofMajestyStore::new(&path).unwrap();

        assert!(path.exists());
        assert!(store.is_empty());
    }

    #[test]
    fn set_then_reload_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("https://example.com/b.jpg", 0.1234567, 2).unwrap();
        store.set("https://example.com/a.png", 0.75, 1).unwrap();
        store.set("https://example.com/c,d.gif", 1.0, 2).unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.len(), 3);
        assert_eq!(
            reloaded.get("https://example.com/b.jpg"),
            Some(FloofScoreEntry { score: 0.123457, version: 2 })
        );
        assert_eq!(
            reloaded.get("https://example.com/a.png"),
            Some(FloofScoreEntry { score: 0.75, version: 1 })
        );
        assert_eq!(reloaded.get("https://example.com/c,d.gif").map(|e| e.score), Some(1.0));
    }

    #[test]
    fn file_is_sorted_with_six_decimals() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("https://z.example/odin.jpg", 0.5, 2).unwrap();
        store.set("https://a.example/odin.jpg", 0.25, 2).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents,
            "https://a.example/odin.jpg,0.250000,2\nhttps://z.example/odin.jpg,0.500000,2\n"
        );
    }

    #[test]
    fn overwrite_replaces_score_and_version() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("https://example.com/odin.jpg", 0.3, 1).unwrap();
        store.set("https://example.com/odin.jpg", 0.6, 2).unwrap();

        assert_eq!(
            store_in(&dir).get("https://example.com/odin.jpg"),
            Some(FloofScoreEntry { score: 0.6, version: 2 })
        );
    }

    #[test]
    fn identical_score_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("https://example.com/odin.jpg", 0.42, 1).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        store.set("https://example.com/odin.jpg", 0.42, 1).unwrap();
        store.set("https://example.com/odin.jpg", 0.42, 2).unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
        // version is left alone when the score matches
        assert_eq!(store.get("https://example.com/odin.jpg").map(|e| e.version), Some(1));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("floof_scores.csv");
        fs::write(
            &path,
            "just-a-url\n\
             https://example.com/bad.jpg,not-a-number\n\
             https://example.com/legacy.jpg,0.900000\n\
             ,0.5,2\n\
             https://example.com/badversion.jpg,0.5,two\n\
             \"https://example.com/quoted,\"\"x\"\".jpg\",0.300000\n\
             \n\
             https://example.com/good.jpg,0.400000,2\n",
        )
        .unwrap();

        let store = FloofMajestyStore::new(&path).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(
            store.get("https://example.com/legacy.jpg"),
            Some(FloofScoreEntry { score: 0.9, version: 0 })
        );
        assert_eq!(
            store.get("https://example.com/quoted,\"x\".jpg"),
            Some(FloofScoreEntry { score: 0.3, version: 0 })
        );
        assert_eq!(
            store.get("https://example.com/good.jpg"),
            Some(FloofScoreEntry { score: 0.4, version: 2 })
        );
    }

    #[test]
    fn top_score_picks_highest() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.top_score().is_none());

        store.set("https://example.com/a.jpg", 0.2, 2).unwrap();
        store.set("https://example.com/b.jpg", 0.8, 2).unwrap();
        store.set("https://example.com/c.jpg", 0.5, 2).unwrap();

        let (url, entry) = store.top_score().unwrap();
        assert_eq!(url, "https://example.com/b.jpg");
        assert_eq!(entry.score, 0.8);
    }

    #[test]
    fn concurrent_sets_and_gets_all_persist() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..50 {
                        let url = format!("https://example.com/{}/{}.jpg", worker, i);
                        store.set(&url, (i as f64) / 50.0 + 0.001, 2).unwrap();
                        assert!(store.get(&url).is_some());
                        let _ = store.top_score();
                    }
                });
            }
        });

        assert_eq!(store.len(), 400);
        let reloaded = store_in(&dir);
        assert_eq!(reloaded.len(), 400);
        assert_eq!(
            reloaded.get("https://example.com/7/49.jpg"),
            Some(FloofScoreEntry { score: 0.981, version: 2 })
        );
    }
}

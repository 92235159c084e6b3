use crate::errors::Error;
use crate::symbol::Symbol;
use async_trait::async_trait;
use mockall::automock;
use std::path::PathBuf;

/// Source of the ordered ticker universe for one run.
#[automock]
#[async_trait]
pub trait UniverseSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Symbol>, Error>;
}

/// Symbols read from a text file.
///
/// Symbols are separated by commas or whitespace, `#` starts a comment.
pub struct FileUniverse {
    path: PathBuf,
}

impl FileUniverse {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileUniverse { path: path.into() }
    }
}

#[async_trait]
impl UniverseSource for FileUniverse {
    async fn load(&self) -> Result<Vec<Symbol>, Error> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Universe(format!("{}: {}", self.path.display(), e)))?;

        let symbols = parse_universe(&contents)?;

        if symbols.is_empty() {
            return Err(Error::Universe(format!(
                "{} contains no symbols",
                self.path.display()
            )));
        }

        Ok(symbols)
    }
}

pub struct StaticUniverse {
    symbols: Vec<Symbol>,
}

impl StaticUniverse {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        StaticUniverse { symbols }
    }
}

#[async_trait]
impl UniverseSource for StaticUniverse {
    async fn load(&self) -> Result<Vec<Symbol>, Error> {
        Ok(self.symbols.clone())
    }
}

pub fn parse_universe(contents: &str) -> Result<Vec<Symbol>, Error> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(Symbol::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_universe() {
        let symbols = parse_universe("AAPL, MSFT\n# comment\n\nGOOG # trailing\nAMZN\tMETA\n").unwrap();

        let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["AAPL", "MSFT", "GOOG", "AMZN", "META"]);
    }

    #[test]
    fn test_parse_universe_keeps_duplicates_in_order() {
        let symbols = parse_universe("AAA\nBBB\nAAA").unwrap();

        let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["AAA", "BBB", "AAA"]);
    }

    #[tokio::test]
    async fn test_file_universe_missing_file() {
        let universe = FileUniverse::new("/nonexistent/symbols.txt");

        let result = universe.load().await;

        assert!(matches!(result, Err(Error::Universe(_))));
    }

    #[tokio::test]
    async fn test_file_universe_reads_file() {
        let path = std::env::temp_dir().join(format!("universe-{}.txt", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "AAPL\nMSFT").unwrap();

        let symbols = FileUniverse::new(&path).load().await.unwrap();

        assert_eq!(symbols.len(), 2);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_file_universe_empty_file() {
        let path = std::env::temp_dir().join(format!("universe-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "# nothing here\n").unwrap();

        let result = FileUniverse::new(&path).load().await;

        assert!(matches!(result, Err(Error::Universe(_))));
        std::fs::remove_file(path).unwrap();
    }
}

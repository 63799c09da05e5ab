//! Statement counting for submitted SQL.
//!
//! The executor accepts exactly one statement per call. SQLite would happily
//! run a whole script, so the count is taken before anything touches the
//! database. Tokenizing (rather than splitting on `;`) keeps semicolons inside
//! string literals, quoted identifiers and comments out of the count.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer, Word};

/// Counts the non-empty statements in `sql`.
///
/// Empty statements (`;;`, trailing `;`, comment-only tails) do not count.
/// Semicolons inside a `CREATE TRIGGER ... BEGIN ... END` body do not end the
/// statement. Returns `None` when the text cannot be tokenized (e.g. an
/// unterminated string); the engine then reports the real error.
pub fn count_statements(sql: &str) -> Option<usize> {
    let dialect = SQLiteDialect {};
    let tokens = Tokenizer::new(&dialect, sql).tokenize().ok()?;

    let mut count = 0;
    let mut current = StatementState::default();

    for token in &tokens {
        match token {
            Token::Whitespace(_) | Token::EOF => {}
            Token::SemiColon if current.body_depth > 0 => {}
            Token::SemiColon => {
                if current.has_content {
                    count += 1;
                }
                current = StatementState::default();
            }
            Token::Word(word) => current.push_word(word),
            _ => current.has_content = true,
        }
    }

    if current.has_content {
        count += 1;
    }
    Some(count)
}

#[derive(Debug, Default)]
struct StatementState {
    has_content: bool,
    leading: Vec<String>,
    body_depth: usize,
}

impl StatementState {
    fn push_word(&mut self, word: &Word) {
        self.has_content = true;
        if word.quote_style.is_some() {
            return;
        }

        let value = word.value.to_uppercase();
        if self.leading.len() < 3 {
            self.leading.push(value.clone());
        }

        if self.is_trigger() {
            match value.as_str() {
                "BEGIN" | "CASE" => self.body_depth += 1,
                "END" => self.body_depth = self.body_depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    fn is_trigger(&self) -> bool {
        match self.leading.as_slice() {
            [create, trigger, ..] if create == "CREATE" && trigger == "TRIGGER" => true,
            [create, temp, trigger]
                if create == "CREATE"
                    && (temp == "TEMP" || temp == "TEMPORARY")
                    && trigger == "TRIGGER" =>
            {
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_statement() {
        assert_eq!(count_statements("SELECT 1"), Some(1));
        assert_eq!(count_statements("SELECT 1;"), Some(1));
        assert_eq!(count_statements("  SELECT 1 ;  ;; -- done\n"), Some(1));
    }

    #[test]
    fn test_several_statements() {
        assert_eq!(count_statements("SELECT 1; SELECT 2"), Some(2));
        assert_eq!(
            count_statements("SELECT 1 AS a; DELETE FROM Students"),
            Some(2)
        );
        assert_eq!(count_statements("BEGIN; UPDATE t SET x = 1; COMMIT;"), Some(3));
    }

    #[test]
    fn test_quoted_semicolons_are_ignored() {
        assert_eq!(count_statements("SELECT ';' AS s"), Some(1));
        assert_eq!(count_statements("SELECT \"a;b\" FROM t"), Some(1));
        assert_eq!(count_statements("SELECT 1 /* ; */ -- ;\n"), Some(1));
    }

    #[test]
    fn test_trigger_body_is_one_statement() {
        let sql = "CREATE TRIGGER log_delete AFTER DELETE ON t
                   BEGIN
                     INSERT INTO audit VALUES (old.id);
                     UPDATE stats SET n = CASE WHEN n > 0 THEN n - 1 ELSE 0 END;
                   END;";
        assert_eq!(count_statements(sql), Some(1));

        let temp = format!("{}\nSELECT 1;", sql.replacen("CREATE", "CREATE TEMP", 1));
        assert_eq!(count_statements(&temp), Some(2));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(count_statements(""), Some(0));
        assert_eq!(count_statements(" ; -- nothing"), Some(0));
    }

    #[test]
    fn test_untokenizable_input_is_left_to_the_engine() {
        assert_eq!(count_statements("SELECT 'unterminated"), None);
    }
}

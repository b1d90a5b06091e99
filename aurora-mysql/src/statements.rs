/// Adds one `b` row under the fixed parent `a.id = 1`.
pub(crate) const INSERT_B: &str = "INSERT INTO b (a_id) VALUES (1)";

pub(crate) const SELECT_B_IDS: &str = "SELECT b.id FROM a JOIN b ON (a.id = b.a_id)";

pub(crate) const CREATE_A: &str = r#"CREATE TABLE IF NOT EXISTS a (
    id BIGINT NOT NULL AUTO_INCREMENT,
    PRIMARY KEY (id)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"#;

pub(crate) const CREATE_B: &str = r#"CREATE TABLE IF NOT EXISTS b (
    id BIGINT NOT NULL AUTO_INCREMENT,
    a_id BIGINT NOT NULL,
    PRIMARY KEY (id),
    CONSTRAINT fk_b_a FOREIGN KEY (a_id) REFERENCES a (id)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"#;

pub(crate) const SEED_A: &str = "INSERT IGNORE INTO a (id) VALUES (1)";

//! SQLite persistence for listening counters and the comment wall.

mod error;
pub mod fs_utils;
mod models;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

pub use error::StorageError;
pub use models::{Comment, NewComment, TrackStats};

/// File name of the database inside the data directory.
pub const DB_FILE_NAME: &str = "comments.db";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nickname TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS track_stats (
        file_id TEXT PRIMARY KEY,
        play_count INTEGER NOT NULL DEFAULT 0,
        finish_count INTEGER NOT NULL DEFAULT 0
    );
";

#[derive(Debug, Clone, Copy)]
enum Counter {
    Play,
    Finish,
}

/// Almacén bloqueante; desde código async hay que llamarlo dentro de `spawn_blocking`.
#[derive(Debug)]
pub struct StatsStore {
    conn: Mutex<Connection>,
}

impl StatsStore {
    /// Abre (o crea) `<data_dir>/comments.db`.
    pub fn open_in(data_dir: &Path) -> Result<Self, StorageError> {
        fs_utils::ensure_dir(data_dir)?;
        fs_utils::check_writable(data_dir)?;
        Self::open(&data_dir.join(DB_FILE_NAME))
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Abriendo la base de datos de estadísticas en {}", path.display());
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;
        Self::initialize(&mut conn)?;
        Ok(StatsStore { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        let mut conn = Connection::open_in_memory()?;
        Self::initialize(&mut conn)?;
        Ok(StatsStore { conn: Mutex::new(conn) })
    }

    fn initialize(conn: &mut Connection) -> Result<(), StorageError> {
        conn.execute_batch(SCHEMA)?;
        debug!("esquema de estadísticas listo");
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn increment_play(&self, file_id: &str) -> Result<(), StorageError> {
        self.bump(file_id, Counter::Play)
    }

    pub fn increment_finish(&self, file_id: &str) -> Result<(), StorageError> {
        self.bump(file_id, Counter::Finish)
    }

    fn bump(&self, file_id: &str, counter: Counter) -> Result<(), StorageError> {
        let sql = match counter {
            Counter::Play => {
                "INSERT INTO track_stats (file_id, play_count, finish_count) VALUES (?1, 1, 0)
                 ON CONFLICT(file_id) DO UPDATE SET play_count = play_count + 1"
            }
            Counter::Finish => {
                "INSERT INTO track_stats (file_id, play_count, finish_count) VALUES (?1, 0, 1)
                 ON CONFLICT(file_id) DO UPDATE SET finish_count = finish_count + 1"
            }
        };
        self.conn().execute(sql, params![file_id])?;
        Ok(())
    }

    /// Ceros para ids que nunca se reprodujeron.
    pub fn stats(&self, file_id: &str) -> Result<TrackStats, StorageError> {
        let stats = self
            .conn()
            .query_row(
                "SELECT play_count, finish_count FROM track_stats WHERE file_id = ?1",
                params![file_id],
                |row| {
                    Ok(TrackStats {
                        play_count: row.get(0)?,
                        finish_count: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(stats.unwrap_or_default())
    }

    pub fn all_stats(&self) -> Result<HashMap<String, TrackStats>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT file_id, play_count, finish_count FROM track_stats")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                TrackStats {
                    play_count: row.get(1)?,
                    finish_count: row.get(2)?,
                },
            ))
        })?;

        let mut out = HashMap::new();
        for row in rows {
            let (id, stats) = row?;
            out.insert(id, stats);
        }
        Ok(out)
    }

    /// Guarda un comentario; ambos campos deben tener texto.
    pub fn create_comment(&self, comment: NewComment) -> Result<Comment, StorageError> {
        let nickname = comment.nickname.trim();
        let content = comment.content.trim();
        if nickname.is_empty() {
            return Err(StorageError::InvalidComment("nickname is empty".into()));
        }
        if content.is_empty() {
            return Err(StorageError::InvalidComment("content is empty".into()));
        }

        let (id, created_at) = self.conn().query_row(
            "INSERT INTO comments (nickname, content, created_at)
             VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
             RETURNING id, created_at",
            params![nickname, content],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )?;

        Ok(Comment {
            id,
            nickname: nickname.to_string(),
            content: content.to_string(),
            created_at,
        })
    }

    /// Del más reciente al más antiguo.
    pub fn comments(&self) -> Result<Vec<Comment>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, nickname, content, created_at FROM comments
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Comment {
                id: row.get(0)?,
                nickname: row.get(1)?,
                content: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }
}

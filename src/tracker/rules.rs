use shakmaty::CastlingMode;
use shakmaty::Chess;
use shakmaty::EnPassantMode;
use shakmaty::Position;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;

/// A move the rules engine refused to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub notation: String,
    pub reason: String,
}

impl std::fmt::Display for Rejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "move {} rejected: {}", self.notation, self.reason)
    }
}

impl std::error::Error for Rejected {}

/// Everything the tracker needs from a chess rules implementation.
pub trait Rules: Send + Sync {
    /// Back to the standard initial position.
    fn reset(&mut self);
    /// Start from an explicit FEN.
    fn load(&mut self, fen: &str) -> Result<(), Rejected>;
    /// Play one move given in UCI or SAN.
    fn play(&mut self, notation: &str) -> Result<(), Rejected>;
    /// Current position as FEN.
    fn fen(&self) -> String;
    /// Legal continuations in UCI.
    fn legal(&self) -> Vec<String>;
}

/// Standard chess backed by shakmaty.
#[derive(Debug, Clone, Default)]
pub struct Standard {
    position: Chess,
}

impl Rules for Standard {
    fn reset(&mut self) {
        self.position = Chess::default();
    }

    fn load(&mut self, fen: &str) -> Result<(), Rejected> {
        let rejected = |reason: String| Rejected {
            notation: fen.to_string(),
            reason,
        };
        self.position = fen
            .parse::<Fen>()
            .map_err(|e| rejected(format!("failed to parse FEN: {}", e)))?
            .into_position(CastlingMode::Standard)
            .map_err(|e| rejected(format!("invalid FEN position: {}", e)))?;
        Ok(())
    }

    fn play(&mut self, notation: &str) -> Result<(), Rejected> {
        let rejected = |reason: String| Rejected {
            notation: notation.to_string(),
            reason,
        };
        let m = match UciMove::from_ascii(notation.as_bytes()) {
            Ok(uci) => uci
                .to_move(&self.position)
                .map_err(|e| rejected(e.to_string()))?,
            Err(_) => San::from_ascii(notation.trim_end_matches(['+', '#']).as_bytes())
                .map_err(|e| rejected(e.to_string()))?
                .to_move(&self.position)
                .map_err(|e| rejected(e.to_string()))?,
        };
        self.position.play_unchecked(&m);
        Ok(())
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn legal(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| UciMove::from_standard(m).to_string())
            .collect()
    }
}

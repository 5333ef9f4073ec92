use std::collections::VecDeque;

/// Rolling window of the most recent question/answer pairs
pub struct History {
    max_exchanges: usize,
    exchanges: VecDeque<(String, String)>,
}

impl History {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            max_exchanges,
            exchanges: VecDeque::with_capacity(max_exchanges),
        }
    }

    pub fn record(&mut self, query: &str, answer: &str) {
        if self.max_exchanges == 0 {
            return;
        }
        if self.exchanges.len() == self.max_exchanges {
            self.exchanges.pop_front();
        }
        self.exchanges
            .push_back((query.to_string(), answer.to_string()));
    }

    /// The window as prompt text, or `None` before the first exchange
    pub fn formatted(&self) -> Option<String> {
        if self.exchanges.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .exchanges
            .iter()
            .map(|(query, answer)| format!("User: {}\nAssistant: {}", query, answer))
            .collect();
        Some(lines.join("\n"))
    }
}

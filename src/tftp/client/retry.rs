use super::error::TransferError;

/// Consecutive-timeout counter for one wait
#[derive(Debug)]
pub struct Retry {
    count: u32,
    budget: u32,
}

impl Retry {
    pub fn new(budget: u32) -> Self {
        Self { count: 0, budget }
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Record a timeout; fails once the budget is used up
    pub fn on_timeout(&mut self) -> Result<u32, TransferError> {
        self.count += 1;
        if self.count >= self.budget {
            return Err(TransferError::Timeout(self.count));
        }
        Ok(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourth_timeout_is_fatal() {
        let mut retry = Retry::new(4);
        assert_eq!(retry.on_timeout().unwrap(), 1);
        assert_eq!(retry.on_timeout().unwrap(), 2);
        assert_eq!(retry.on_timeout().unwrap(), 3);
        assert!(matches!(retry.on_timeout(), Err(TransferError::Timeout(4))));
    }

    #[test]
    fn reset_restores_budget() {
        let mut retry = Retry::new(2);
        retry.on_timeout().unwrap();
        retry.reset();
        assert_eq!(retry.on_timeout().unwrap(), 1);
        assert!(retry.on_timeout().is_err());
    }
}

//! WebSocket connection handle

use tokio::sync::mpsc;
use uuid::Uuid;

/// Handle to a live charger connection.
///
/// Outbound text is pushed onto `sender`; the connection's writer task owns
/// the receiving end. The handle is open while that task is alive.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Unique per accepted socket, distinguishes reconnects under one id
    pub connection_id: Uuid,
    pub charge_point_id: String,
    pub sender: mpsc::UnboundedSender<String>,
}

impl Connection {
    pub fn new(charge_point_id: impl Into<String>, sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            charge_point_id: charge_point_id.into(),
            sender,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a message for the charger
    pub fn send(&self, message: String) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|e| format!("Failed to send message: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_connection() -> (Connection, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new("CP001", tx), rx)
    }

    #[test]
    fn send_delivers_message() {
        let (conn, mut rx) = make_connection();
        conn.send("hello".into()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "hello");
    }

    #[test]
    fn closed_when_writer_is_gone() {
        let (conn, rx) = make_connection();
        assert!(conn.is_open());
        drop(rx);
        assert!(!conn.is_open());
        assert!(conn.send("msg".into()).is_err());
    }

    #[test]
    fn connection_ids_are_unique() {
        let (a, _ra) = make_connection();
        let (b, _rb) = make_connection();
        assert_ne!(a.connection_id, b.connection_id);
    }
}

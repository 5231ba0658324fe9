/// Outbound message ids. Both dialects share them; the last two are only
/// understood by the athena server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ClientCommandType {
    DropItem = 0x00a2,
    UseItem = 0x00a7,
    Equip = 0x00a9,
    Unequip = 0x00ab,
    MoveToStorage = 0x00f3,
    MoveFromStorage = 0x00f5,
    CloseStorage = 0x00f7,
    MoveItem = 0x0231,
    OpenStorage = 0x0232,
}

impl ClientCommandType {
    pub fn id(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    header: ClientCommandType,
    payload: Vec<u8>,
}

impl ClientCommand {
    /// Creates a command with a specific header and raw payload bytes.
    fn new(header: ClientCommandType, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> ClientCommandType {
        self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serializes the command: little-endian u16 id followed by the fields.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.payload.len());
        bytes.extend_from_slice(&self.header.id().to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Packet helper: i16 at +2, i16 at +4.
    fn cmd_i16_i16(cmd: ClientCommandType, x: i16, y: i16) -> Self {
        let mut payload = Vec::with_capacity(4);
        payload.extend_from_slice(&x.to_le_bytes());
        payload.extend_from_slice(&y.to_le_bytes());
        Self::new(cmd, payload)
    }

    /// Packet helper: i16 at +2, i32 at +4.
    fn cmd_i16_i32(cmd: ClientCommandType, x: i16, y: i32) -> Self {
        let mut payload = Vec::with_capacity(6);
        payload.extend_from_slice(&x.to_le_bytes());
        payload.extend_from_slice(&y.to_le_bytes());
        Self::new(cmd, payload)
    }

    /// Asks the server to equip the inventory item at wire index `index`.
    pub fn new_equip(index: i16) -> Self {
        log::debug!("Building equip packet: index={}", index);
        Self::cmd_i16_i16(ClientCommandType::Equip, index, 0)
    }

    pub fn new_unequip(index: i16) -> Self {
        log::debug!("Building unequip packet: index={}", index);
        Self::new(ClientCommandType::Unequip, index.to_le_bytes().to_vec())
    }

    /// The item id rides along so the server can reject a use that raced a
    /// slot change.
    pub fn new_use(index: i16, type_id: i32) -> Self {
        log::debug!("Building use packet: index={}, item={}", index, type_id);
        Self::cmd_i16_i32(ClientCommandType::UseItem, index, type_id)
    }

    pub fn new_drop(index: i16, amount: i16) -> Self {
        log::debug!("Building drop packet: index={}, amount={}", index, amount);
        Self::cmd_i16_i16(ClientCommandType::DropItem, index, amount)
    }

    pub fn new_move_to_storage(index: i16, amount: i32) -> Self {
        log::debug!(
            "Building move-to-storage packet: index={}, amount={}",
            index,
            amount
        );
        Self::cmd_i16_i32(ClientCommandType::MoveToStorage, index, amount)
    }

    pub fn new_move_from_storage(index: i16, amount: i32) -> Self {
        log::debug!(
            "Building move-from-storage packet: index={}, amount={}",
            index,
            amount
        );
        Self::cmd_i16_i32(ClientCommandType::MoveFromStorage, index, amount)
    }

    /// Moves `amount` from one inventory slot to another: a split when the
    /// amount is partial, a reorder when it is the whole stack.
    pub fn new_move_item(from: i16, to: i16, amount: i16) -> Self {
        let mut payload = Vec::with_capacity(6);
        payload.extend_from_slice(&from.to_le_bytes());
        payload.extend_from_slice(&to.to_le_bytes());
        payload.extend_from_slice(&amount.to_le_bytes());

        log::debug!(
            "Building move-item packet: from={}, to={}, amount={}",
            from,
            to,
            amount
        );
        Self::new(ClientCommandType::MoveItem, payload)
    }

    pub fn new_open_storage() -> Self {
        log::debug!("Building open-storage packet");
        Self::new(ClientCommandType::OpenStorage, Vec::new())
    }

    pub fn new_close_storage() -> Self {
        log::debug!("Building close-storage packet");
        Self::new(ClientCommandType::CloseStorage, Vec::new())
    }
}

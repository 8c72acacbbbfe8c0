/// Pane that receives scroll keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Chat,
    ExecutionLog,
    Cards,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Chat => Focus::ExecutionLog,
            Focus::ExecutionLog => Focus::Cards,
            Focus::Cards => Focus::Chat,
        }
    }
}

/// When the tracker reports a blank line directly after an option or
/// line-group item as BLANK_LINE, ending the surrounding group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OptionBreak {
    /// Only after an item whose nested block was just closed.
    #[default]
    AfterNestedBlock,
    /// After every item.
    AfterAnyItem,
    /// Never; blank lines are always trivia.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScannerConfig {
    /// Columns a tab contributes to an indentation width.
    pub tab_width: u16,
    pub option_break: OptionBreak,
    /// Whether line groups (`=>`) are split by blank lines like options.
    pub break_line_groups: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { tab_width: 8, option_break: OptionBreak::default(), break_line_groups: true }
    }
}

impl ScannerConfig {
    /// Whether the group parser should ask for BLANK_LINE after an item.
    pub fn breaks_after(&self, had_block: bool, line_group: bool) -> bool {
        if line_group && !self.break_line_groups {
            return false;
        }

        match self.option_break {
            OptionBreak::AfterNestedBlock => had_block,
            OptionBreak::AfterAnyItem => true,
            OptionBreak::Never => false,
        }
    }
}

use std::fmt::Display;

// ==== Storage ================================================================

/// A picture clause, the storage format of one elementary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pic {
    /// One digit holding 1 or 0.
    Flag,
    /// Signed integer with a fixed number of digits.
    Signed { digits: u8 },
    /// Signed fixed point.
    Fixed { int: u8, frac: u8 },
    /// Space-padded character buffer.
    Alnum { width: usize },
    /// Native binary counter, used for table lengths.
    Index { digits: u8 },
}

impl Display for Pic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pic::Flag => write!(f, "pic 9"),
            Pic::Signed { digits } => write!(f, "pic s9({})", digits),
            Pic::Fixed { int, frac } => write!(f, "pic s9({})v9({})", int, frac),
            Pic::Alnum { width } => write!(f, "pic x({})", width),
            Pic::Index { digits } => write!(f, "pic 9({}) comp-5", digits),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Scalar(Pic),
    /// A length field followed by an `occurs ... depending on` table.
    Table {
        index: Pic,
        elem: Pic,
        capacity: usize,
    },
}

/// One uniquely named piece of storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    pub name: String,
    pub shape: Shape,
}

impl DataItem {
    pub fn is_sequence(&self) -> bool {
        matches!(self.shape, Shape::Table { .. })
    }

    /// Name of the length field of a table.
    pub fn len_name(&self) -> String {
        format!("{}-len", self.name)
    }

    /// Name of the repeated element of a table.
    pub fn elem_name(&self) -> String {
        format!("{}-el", self.name)
    }

    /// Reference to the element at `index` (1-based).
    pub fn elem_at(&self, index: impl Display) -> String {
        format!("{}({})", self.elem_name(), index)
    }
}

/// Where an item is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    WorkingStorage,
    /// Items received from the caller; no `value` clauses allowed.
    Linkage,
}

/// A rendered operand: inline literal text or storage that was initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Inline(String),
    Item(DataItem),
}

// ==== Procedure ==============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    Reference,
    Content,
}

impl Display for Passing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Passing::Reference => write!(f, "by reference"),
            Passing::Content => write!(f, "by content"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cond {
    Equal(String, String),
    NotEqual(String, String),
    Greater(String, String),
}

impl Display for Cond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cond::Equal(l, r) => write!(f, "{} = {}", l, r),
            Cond::NotEqual(l, r) => write!(f, "{} not = {}", l, r),
            Cond::Greater(l, r) => write!(f, "{} > {}", l, r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Comment(String),
    Move {
        from: String,
        to: String,
    },
    Call {
        program: String,
        args: Vec<(Passing, String)>,
    },
    Perform(String),
    /// `perform varying counter from 1 by 1 until cond ... end-perform`
    Loop {
        counter: String,
        until: Cond,
        body: Vec<Stmt>,
    },
    If {
        cond: Cond,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    Display(String),
    Add {
        amount: u32,
        to: String,
    },
    Continue,
    ExitParagraph,
    Goback,
}

/// A generated paragraph deciding whether two tables are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub name: String,
    pub left: String,
    pub right: String,
    pub body: Vec<Stmt>,
}

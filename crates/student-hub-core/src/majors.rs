//! Major catalog offered by the campus, with the surface forms the advisor tends to use.

/// One entry of the major catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Major {
    /// Vietnamese name, as listed in the consultation prompt.
    pub name: &'static str,
    /// English label shown next to the name in the prompt.
    pub english: &'static str,
    /// Surface forms searched for in advisor replies, in priority order.
    pub aliases: &'static [&'static str],
}

pub const MAJOR_CATALOG: [Major; 10] = [
    Major {
        name: "Công nghệ thông tin",
        english: "IT",
        aliases: &["Công nghệ thông tin", "IT", "Lập trình"],
    },
    Major {
        name: "Thiết kế đồ họa",
        english: "Graphic Design",
        aliases: &["Thiết kế đồ họa", "Graphic Design", "Thiết kế"],
    },
    Major {
        name: "Marketing số",
        english: "Digital Marketing",
        aliases: &["Marketing số", "Digital Marketing", "Marketing"],
    },
    Major {
        name: "Quản trị kinh doanh",
        english: "Business Administration",
        aliases: &["Quản trị kinh doanh", "Business", "Kinh doanh"],
    },
    Major {
        name: "Kế toán",
        english: "Accounting",
        aliases: &["Kế toán", "Accounting"],
    },
    Major {
        name: "Du lịch",
        english: "Tourism",
        aliases: &["Du lịch", "Tourism"],
    },
    Major {
        name: "Ngôn ngữ Anh",
        english: "English Language",
        aliases: &["Ngôn ngữ Anh", "English"],
    },
    Major {
        name: "Điện tử viễn thông",
        english: "Electronics & Telecommunications",
        aliases: &["Điện tử viễn thông", "Electronics"],
    },
    Major {
        name: "Cơ khí",
        english: "Mechanical Engineering",
        aliases: &["Cơ khí", "Mechanical"],
    },
    Major {
        name: "Xây dựng",
        english: "Civil Engineering",
        aliases: &["Xây dựng", "Civil"],
    },
];

/// Every alias of every major, catalog order then alias order.
pub fn alias_table() -> impl Iterator<Item = &'static str> {
    MAJOR_CATALOG.iter().flat_map(|m| m.aliases.iter().copied())
}

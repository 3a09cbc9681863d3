//! Canned replies used when the hosted model cannot answer.
//!
//! Keyword table is scanned in order and the first keyword found in the lowercased input
//! wins. Unmatched input gets one of the generic replies, picked with the responder's own
//! random source so tests can pin the choice with a seed.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Keyword -> reply. Order is priority.
const KEYWORD_REPLIES: &[(&str, &str)] = &[
    (
        "quy chế",
        "📋 **Quy chế thi cử quan trọng:**
• Có mặt trước 15 phút, mang thẻ sinh viên
• Không sử dụng tài liệu (trừ khi được phép)
• Tuyệt đối không gian lận
• Vi phạm sẽ bị xử lý nghiêm túc theo quy định

*Bạn cần thông tin chi tiết gì về quy chế không?* 🤔",
    ),
    (
        "thi cử",
        "📚 **Tips thi cử thành công:**
✅ Chuẩn bị tâm lý tốt, tự tin
✅ Ôn tập kỹ lưỡng theo đề cương
✅ Đến sớm 15-30 phút
✅ Kiểm tra dụng cụ cần thiết
✅ Đọc kỹ đề bài trước khi làm
✅ Phân bổ thời gian hợp lý
✅ Kiểm tra lại bài trước khi nộp

*Chúc bạn thi tốt!* 💪",
    ),
    (
        "học tập",
        "🎯 **Cải thiện kết quả học tập:**
📅 Lập kế hoạch học tập rõ ràng
👨‍🏫 Tham gia đầy đủ các buổi học
❓ Chủ động đặt câu hỏi với giảng viên
📝 Làm bài tập thường xuyên
👥 Tạo nhóm học tập cùng bạn
😴 Nghỉ ngơi đầy đủ, tránh thức khuya
🏃‍♂️ Tập thể dục để tăng sức khỏe não bộ

*Bạn gặp khó khăn ở môn nào cụ thể không?* 🤗",
    ),
    (
        "công nghệ thông tin",
        "💻 **Lộ trình học CNTT:**
**Năm 1-2: Nền tảng**
• Lập trình (C++, Java, Python)
• Cơ sở dữ liệu (MySQL, MongoDB)
• Mạng máy tính & Bảo mật cơ bản

**Năm 3: Chuyên sâu**
• AI/Machine Learning
• Phát triển Web (React, Laravel)
• Mobile App (Flutter, React Native)
• DevOps & Cloud Computing

**Năm 4: Thực chiến**
• Thực tập doanh nghiệp
• Đồ án tốt nghiệp
• Chuẩn bị nghề nghiệp

*Bạn quan tâm chuyên ngành nào nhất?* 🚀",
    ),
    (
        "thời gian",
        "⏰ **Quản lý thời gian siêu hiệu quả:**
🍅 **Pomodoro Technique:** 25 phút học + 5 phút nghỉ
📝 **To-do List:** Ưu tiên công việc quan trọng
🎯 **SMART Goals:** Mục tiêu cụ thể, đo lường được
📵 **Digital Detox:** Tắt thông báo khi học
⚖️ **Work-Life Balance:** Cân bằng học tập và giải trí
🌅 **Morning Routine:** Dậy sớm để có thời gian cho bản thân

*Bạn đang gặp khó khăn gì trong việc quản lý thời gian?* ⏳",
    ),
    (
        "trí tuệ nhân tạo",
        "🤖 **AI - Tương lai của công nghệ:**
**Cơ bản cần học:**
• Python Programming
• Machine Learning (Scikit-learn)
• Deep Learning (TensorFlow, PyTorch)
• Data Science & Analytics
• Computer Vision & NLP

**Dự án thực hành:**
• Chatbot thông minh
• Nhận dạng hình ảnh
• Dự đoán giá cổ phiếu
• Hệ thống gợi ý

*Bạn muốn bắt đầu từ đâu với AI?* 🧠",
    ),
    (
        "chào",
        "👋 **Xin chào bạn!**
Mình là Student Hub AI - trợ lý thông minh dành riêng cho sinh viên!

🎓 Mình có thể giúp bạn với:
• Tư vấn học tập & quy chế trường
• Lộ trình phát triển nghề nghiệp
• Hỗ trợ kỹ thuật lập trình
• Tips quản lý thời gian hiệu quả

*Bạn cần hỗ trợ gì hôm nay?* ✨",
    ),
    (
        "hello",
        "🌟 **Hello there!**
I'm Student Hub AI - your smart academic assistant!

📚 I can help you with:
• Study tips & academic guidance
• University regulations & procedures
• Career development roadmap
• Technical programming support
• Time management strategies

*What can I help you with today?* 🚀",
    ),
];

/// Generic replies for input that matches no keyword.
const GENERIC_REPLIES: &[&str] = &[
    "🤔 **Câu hỏi thú vị!** Để được hỗ trợ tốt nhất, bạn có thể:
• Tham khảo thư viện trường với tài liệu chuyên sâu
• Hỏi trực tiếp giảng viên để có thông tin chính xác nhất
• Tham gia nhóm học tập với các bạn cùng lớp

*Bạn có thể chia sẻ thêm chi tiết để mình hỗ trợ tốt hơn không?* 📚",
    "🌟 **Cảm ơn bạn đã tin tưởng Student Hub AI!**
Mình đang liên tục học hỏi để cải thiện khả năng hỗ trợ sinh viên.

💡 **Gợi ý:** Hãy thử hỏi về:
• \"Cách học hiệu quả\"
• \"Quy chế thi cử\"
• \"Lộ trình CNTT\"
• \"Quản lý thời gian\"

*Có điều gì khác mình có thể giúp bạn?* 🎯",
    "📈 **Chủ đề rất quan trọng trong đời sinh viên!**
Mình khuyên bạn nên:
• Kết hợp nhiều nguồn thông tin đáng tin cậy
• Trải nghiệm thực tế qua thực tập, dự án
• Tham khảo ý kiến từ các anh chị đi trước
• Không ngại thử nghiệm và học hỏi từ thất bại

*Bạn có muốn mình tư vấn cụ thể về vấn đề nào không?* 💪",
    "🚀 **Student Hub AI luôn sẵn sàng hỗ trợ!**
Dù câu hỏi này hơi mới với mình, nhưng mình tin rằng:
• Mỗi thắc mắc đều có giá trị học tập
• Sự tò mò là động lực phát triển
• Học hỏi là hành trình không có điểm dừng

*Hãy thử đặt câu hỏi theo cách khác, mình sẽ cố gắng hết sức!* ✨",
];

/// Keyword reply for `text`, if any keyword occurs in it.
pub fn keyword_reply(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KEYWORD_REPLIES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, reply)| *reply)
}

/// Always returns a non-empty reply.
pub fn fallback_reply<R: Rng>(text: &str, rng: &mut R) -> &'static str {
    keyword_reply(text).unwrap_or_else(|| GENERIC_REPLIES[rng.gen_range(0..GENERIC_REPLIES.len())])
}

/// Shareable responder owning its random source.
pub struct FallbackResponder {
    rng: Mutex<StdRng>,
}

impl FallbackResponder {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generic-reply selection.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng: Mutex::new(rng) }
    }

    pub fn respond(&self, text: &str) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        fallback_reply(text, &mut *rng).to_string()
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_keyword_in_table_order_wins() {
        // Both "thi cử" and "quy chế" occur; "quy chế" is listed first.
        let reply = keyword_reply("Cho mình hỏi về thi cử và quy chế").unwrap();
        assert!(reply.contains("Quy chế thi cử quan trọng"));
    }

    #[test]
    fn keyword_match_ignores_case() {
        let reply = keyword_reply("HELLO bot").unwrap();
        assert!(reply.starts_with("🌟 **Hello there!**"));
        assert!(keyword_reply("Học Tập thế nào?").is_some());
    }

    #[test]
    fn every_input_gets_a_non_empty_reply() {
        let responder = FallbackResponder::seeded(7);
        for input in ["", "   ", "xyz", "quy chế", "🙂", "what is the meaning of life"] {
            assert!(!responder.respond(input).is_empty(), "empty reply for {input:?}");
        }
    }

    #[test]
    fn unmatched_input_draws_from_the_generic_pool() {
        let responder = FallbackResponder::seeded(42);
        for _ in 0..20 {
            let reply = responder.respond("zzz");
            assert!(GENERIC_REPLIES.contains(&reply.as_str()));
        }
    }

    #[test]
    fn same_seed_same_selection() {
        let a = FallbackResponder::seeded(1234);
        let b = FallbackResponder::seeded(1234);
        let picks_a: Vec<String> = (0..8).map(|_| a.respond("no keyword here")).collect();
        let picks_b: Vec<String> = (0..8).map(|_| b.respond("no keyword here")).collect();
        assert_eq!(picks_a, picks_b);
    }
}

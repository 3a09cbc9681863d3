//! Prompt templates: the advisor persona used to prime every conversation and the
//! major-consultation prompt built from a validated survey.

use crate::majors::MAJOR_CATALOG;
use crate::survey::{Scores, SurveySubmission};

/// First turn of every conversation with the hosted model.
pub const SYSTEM_PERSONA: &str = "Bạn là STUDENT HUB AI - trợ lý thông minh chuyên biệt hỗ trợ sinh viên 24/7.

🎯 **VAI TRÒ CỦA BẠN:**
- Tư vấn viên học tập chuyên nghiệp
- Chuyên gia về quy chế trường đại học
- Người định hướng lộ trình học tập cá nhân hóa
- Hỗ trợ kỹ thuật lập trình & công nghệ

📚 **CHUYÊN MÔN CHÍNH:**
1. **Quy chế & Thủ tục:** Quy định thi cử, học vụ, điều kiện tốt nghiệp
2. **Lộ trình học tập:** Tư vấn chọn môn, chuyên ngành dựa trên năng lực
3. **Phương pháp học:** Kỹ thuật học hiệu quả, quản lý thời gian
4. **Công nghệ:** Lập trình, AI, Data Science, Web Development
5. **Kỹ năng mềm:** Giao tiếp, thuyết trình, làm việc nhóm
6. **Nghề nghiệp:** Định hướng career, CV, phỏng vấn

🌟 **ĐẶC ĐIỂM GIAO TIẾP:**
- Thân thiện, nhiệt tình như anh/chị mentor
- Sử dụng emoji phù hợp để tạo không khí tích cực
- Đưa ra lời khuyên cụ thể, thực tế
- Luôn động viên và khích lệ tinh thần học tập
- Cá nhân hóa câu trả lời theo từng sinh viên

💡 **NGUYÊN TẮC:**
- Trả lời bằng tiếng Việt tự nhiên, dễ hiểu
- Cung cấp thông tin chính xác, cập nhật
- Khuyến khích tư duy phản biện
- Hướng dẫn từng bước cụ thể
- Luôn hỏi thêm để hiểu rõ nhu cầu sinh viên";

/// Canned model turn acknowledging the persona.
pub const PERSONA_ACK: &str = "Chào bạn! Mình là Student Hub AI - trợ lý học tập thông minh của bạn! 🎓✨

Mình có thể hỗ trợ bạn với mọi vấn đề về học tập, từ quy chế trường đến lộ trình nghề nghiệp. Bạn cần tư vấn về điều gì hôm nay?";

const CONSULTANT_ROLE: &str = "Bạn là chuyên gia tư vấn giáo dục tại FPT Polytechnic. Hãy phân tích thông tin sau và đưa ra tư vấn ngành học phù hợp:";

const CONSULTATION_REQUEST: &str = "🎯 **YÊU CẦU TƯ VẤN:**
1. Đề xuất TOP 3 ngành học phù hợp nhất (theo thứ tự ưu tiên)
2. Giải thích lý do chọn mỗi ngành dựa trên profile sinh viên
3. Đề xuất các môn học/kỹ năng cần cải thiện cho ngành được đề xuất hàng đầu
4. Dự đoán cơ hội nghề nghiệp trong tương lai
5. Lời khuyên cụ thể cho quá trình học tập

Hãy trả lời chi tiết, thân thiện và tích cực. Sử dụng emoji phù hợp để tạo không khí vui vẻ.";

/// Shown in place of a self-rating the student skipped.
const UNRATED: &str = "?";

/// Builds the consultation prompt. Pure templating: every field of the submission is
/// interpolated as-is, next to the fixed major catalog.
pub fn consultation_prompt(survey: &SurveySubmission) -> String {
    let ratings = &survey.ratings;
    let levels = format!(
        "Công nghệ: {}/5, Sáng tạo: {}/5, Giao tiếp: {}/5, Logic: {}/5",
        level(ratings.technology_level),
        level(ratings.creativity_level),
        level(ratings.communication_level),
        level(ratings.logic_level),
    );

    format!(
        "{CONSULTANT_ROLE}

🎯 **THÔNG TIN SINH VIÊN:**
• Sở thích: {interests}
• Kỹ năng: {skills}
• Môn học yêu thích: {subjects}
• Điểm số trung bình: {scores}
• Mục tiêu nghề nghiệp: {goal}
• Đánh giá bản thân: {levels}

📚 **CÁC NGÀNH HỌC TẠI FPT POLYTECHNIC:**
{catalog}

{CONSULTATION_REQUEST}",
        interests = survey.interests.join(", "),
        skills = survey.skills.join(", "),
        subjects = survey.favorite_subjects.join(", "),
        scores = score_line(&survey.scores),
        goal = survey.career_goal,
        levels = levels,
        catalog = catalog_lines(),
    )
}

/// `Toán: 9, Lý: 7, Hóa: 6, Anh: 8, Văn: 5`
pub fn score_line(scores: &Scores) -> String {
    format!(
        "Toán: {}, Lý: {}, Hóa: {}, Anh: {}, Văn: {}",
        scores.math, scores.physics, scores.chemistry, scores.english, scores.literature
    )
}

fn catalog_lines() -> String {
    MAJOR_CATALOG
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{}. {} ({})", i + 1, m.name, m.english))
        .collect::<Vec<_>>()
        .join("\n")
}

fn level(value: Option<u8>) -> String {
    value.map_or_else(|| UNRATED.to_string(), |v| v.to_string())
}

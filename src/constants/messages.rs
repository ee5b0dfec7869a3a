// ABOUTME: Fixed user-facing and operator-facing reply strings
// ABOUTME: Escalation acknowledgements, command replies and generic failure messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Prefix of the escalation acknowledgement; the user's message follows it
pub const ESCALATION_ACK_PREFIX: &str = "✅ ขออภัยครับ ระบบได้ส่งคำขอของคุณไปยังผู้ดูแลแล้ว กรุณารอสักครู่ ผู้ดูแลจะติดต่อกลับมาในเร็วๆ นี้ครับ\n\n💬 ข้อความของคุณ: ";
/// Escalation request failed
pub const ESCALATION_REQUEST_FAILED: &str = "เกิดข้อผิดพลาดในการส่งคำขอ กรุณาลองใหม่อีกครั้งครับ";
/// Operator reply recorded
pub const ADMIN_RESPONSE_SENT: &str = "✅ ข้อความจากผู้ดูแลถูกส่งไปยังผู้ใช้แล้ว";
/// Operator reply failed
pub const ADMIN_RESPONSE_FAILED: &str = "เกิดข้อผิดพลาดในการส่งข้อความ กรุณาลองใหม่อีกครั้ง";
/// Escalation ended, back to persona mode
pub const ESCALATION_ENDED: &str = "✅ ระบบได้กลับไปยังโหมดตัวละครแล้วครับ";
/// Ending the escalation failed
pub const ESCALATION_END_FAILED: &str = "เกิดข้อผิดพลาดในการเปลี่ยนโหมด กรุณาลองใหม่อีกครั้งครับ";
/// No session exists for the user
pub const SESSION_NOT_FOUND: &str = "ไม่พบข้อมูลเซสชันของผู้ใช้";
/// Session lookup failed
pub const SESSION_LOOKUP_FAILED: &str = "เกิดข้อผิดพลาดในการดึงข้อมูล";
/// Operator assigned
pub const ADMIN_ASSIGNED: &str = "✅ ผู้ดูแลถูกมอบหมายให้ดูแลผู้ใช้นี้แล้ว";
/// Operator assignment failed
pub const ADMIN_ASSIGN_FAILED: &str = "เกิดข้อผิดพลาดในการมอบหมายผู้ดูแล";

/// Reply while the user waits for an operator
pub const WAITING_FOR_ADMIN: &str =
    "⏳ ผู้ดูแลได้รับข้อความของคุณแล้ว กรุณารอสักครู่ครับ\nพิมพ์ /back เพื่อกลับไปคุยกับตัวละคร";
/// Entering info mode
pub const INFO_MODE_ENTERED: &str = "🏥 เข้าสู่โหมดข้อมูลแล้วครับ ถามเรื่องการสมัคร วันที่ สถานที่ หรือการติดต่อได้เลย\nพิมพ์ /back เพื่อกลับไปคุยกับตัวละคร";
/// Conversation memory cleared
pub const MEMORY_RESET: &str = "🔄 เริ่มบทสนทนาใหม่แล้วครับ";
/// Persona lookup failed
pub const PERSONA_NOT_FOUND: &str = "ไม่พบตัวละครนี้ครับ พิมพ์ /characters เพื่อดูรายชื่อตัวละครทั้งหมด";
/// `/switch` without a name
pub const SWITCH_USAGE: &str = "กรุณาระบุชื่อตัวละคร เช่น /switch Sherlock";
/// No active personas in the catalog
pub const NO_PERSONAS: &str = "ขออภัยครับ ขณะนี้ยังไม่มีตัวละครที่พร้อมให้บริการ";
/// Header of the persona list
pub const PERSONA_LIST_HEADER: &str = "🎭 ตัวละครที่คุยด้วยได้:";
/// Footer of the persona list
pub const PERSONA_LIST_FOOTER: &str = "พิมพ์ /switch <ชื่อ> เพื่อเปลี่ยนตัวละคร";
/// Unknown slash command
pub const UNKNOWN_COMMAND: &str = "ไม่รู้จักคำสั่งนี้ครับ พิมพ์ /help เพื่อดูคำสั่งทั้งหมด";
/// Turn failed before any text could be produced
pub const TURN_FAILED: &str = "ขออภัยครับ ระบบขัดข้องชั่วคราว กรุณาลองใหม่อีกครั้งครับ";

/// `/help` reply
pub const HELP: &str = "📖 คำสั่งที่ใช้ได้:\n\
/characters - ดูรายชื่อตัวละคร\n\
/switch <ชื่อ> - เปลี่ยนตัวละคร\n\
/admin [ข้อความ] - ขอคุยกับผู้ดูแล\n\
/info - ข้อมูลค่ายเส้นทางสู่หมอศิริราช\n\
/back - กลับไปคุยกับตัวละคร\n\
/reset - เริ่มบทสนทนาใหม่\n\
/help - แสดงคำสั่งทั้งหมด";

/// Quick-reply labels attached to persona replies
pub const DEFAULT_QUICK_REPLIES: &[&str] = &["/characters", "/info", "/admin", "/help"];

/// Escalation text used when `/admin` carries no message
pub const ADMIN_REQUEST_DEFAULT: &str = "ขอคุยกับผู้ดูแล";

/// Reply after a successful persona switch
#[must_use]
pub fn persona_switched(name: &str) -> String {
    format!("✨ ตอนนี้คุณกำลังคุยกับ {name} แล้วครับ")
}
